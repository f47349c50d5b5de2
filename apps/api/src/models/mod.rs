pub mod certificate;
pub mod resume;
