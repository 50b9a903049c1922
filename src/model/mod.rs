//! Person/partnership model
//!
//! Plain input records plus [`Family`], the validated snapshot every layout
//! stage reads from.

pub mod error;
pub mod family;
pub mod person;

pub use error::ValidationError;
pub use family::Family;
pub use person::{Parentage, PartnershipKind, PartnershipRecord, Person, PersonId, Relation};
