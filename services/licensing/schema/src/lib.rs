//! sea-orm entities for the licensing service.

pub mod admins;
pub mod definition_updates;
pub mod license_keys;
pub mod virus_signatures;
