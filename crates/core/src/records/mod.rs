//! Domain records, their DTO projections, request payloads and validation.
//!
//! Records are what repositories persist and cache. DTOs are what the HTTP
//! layer returns: plain projections without nested-set internals, except for
//! the `*NodeDto` types served by subtree and ancestor queries.

mod error;
mod media;
mod requests;
mod setting;
mod taxonomy;
mod user;

pub use error::RecordError;
pub use media::{validate_media, Media, MediaDto, MediaNodeDto};
pub use requests::{
    CreateMediaRequest, CreateTaxonomyRequest, CreateUserRequest, MoveNodeRequest,
    PutSettingRequest, UpdateMediaRequest, UpdateTaxonomyRequest, UpdateUserRequest,
};
pub use setting::{validate_setting, Setting};
pub use taxonomy::{validate_taxonomy, Taxonomy, TaxonomyDto, TaxonomyNodeDto};
pub use user::{validate_user, User, UserDto};
