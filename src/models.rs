//! In this module are declared the entities manipulated by this program:
//! the records sent back by the API and the field selections that
//! drive the reports.

pub mod fields;
pub mod record;
