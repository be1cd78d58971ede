use common::model::participant::Participant;

/// Text to draw for `field`: the participant's standard attribute when it has
/// one, otherwise the custom field of that name. `None` means nothing is drawn.
pub fn resolve_field<'a>(participant: &'a Participant, field: &str) -> Option<&'a str> {
    participant
        .standard_field(field)
        .or_else(|| participant.custom_fields.get(field))
}
