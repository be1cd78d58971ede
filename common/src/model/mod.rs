pub mod batch;
pub mod certificate;
pub mod custom_fields;
pub mod participant;
pub mod template;
