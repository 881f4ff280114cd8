//! Data models

pub mod book;
pub mod notion;
pub mod skill;

pub use book::{BookRecord, Format, Rating, ReadingStatus, StatusUpdate};
pub use notion::{Filter, Page, Property, PropertyMap, PropertyValue, QueryResponse};
pub use skill::{RequestEnvelope, ResponseBuilder, ResponseEnvelope, SkillRequest};
