//! API Guidance
//!
//! Projects a full OpenAPI contract down to a context-specific guidance
//! contract: the one operation a caller is about to use, its request-body
//! schemas, and nothing else, with fields required, removed, or enum values
//! restricted according to the caller's use-case and roles.
//!
//! # Example
//!
//! ```
//! use api_guidance::{load_document_str, project, GuidanceOptions, Schema, UseCase, UserRole};
//!
//! let document = load_document_str(r#"
//! paths:
//!   /api/Users:
//!     post:
//!       requestBody:
//!         content:
//!           application/json:
//!             schema: { $ref: '#/components/schemas/User' }
//! components:
//!   schemas:
//!     User:
//!       type: object
//!       properties:
//!         userName: { type: string }
//!         email: { type: string }
//!         address: { type: string }
//!         zipCode: { type: string }
//!         identificationType: { $ref: '#/components/schemas/IdentificationType' }
//!         roles: { type: array, items: { $ref: '#/components/schemas/UserRole' } }
//!     UserRole: { type: string, enum: [retailUser, tradeManager] }
//!     IdentificationType: { type: string, enum: [none, passport] }
//!     ProblemDetails: { type: object }
//! "#).unwrap();
//!
//! let options = GuidanceOptions::new("/api/users", "post".parse().unwrap())
//!     .use_case(UseCase::LightweightClient)
//!     .roles([UserRole::RetailUser]);
//! let guidance = project(document, &options).unwrap();
//!
//! let user = guidance.component("User").and_then(Schema::as_inline).unwrap();
//! assert!(user.properties.get("email").is_none());
//! assert!(guidance.component("ProblemDetails").is_none());
//! // Only the removed property referenced it, so it survives pruning.
//! assert!(guidance.component("IdentificationType").is_some());
//! ```
//!
//! # Pipeline
//!
//! | Stage | Function | Effect |
//! |-------|----------|--------|
//! | select | [`select`] | keep one path (case-insensitive) and one verb |
//! | prune | [`prune_to_request_body`] | drop component schemas the request body cannot reach |
//! | adjust | [`apply_edits`] | mark required, remove properties, limit enums |
//!
//! [`project`] runs all three with the edits resolved from a [`PolicyTable`].

mod adjust;
mod draft;
mod error;
mod guidance;
mod loader;
mod model;
mod policy;
mod prune;
mod select;
mod types;
mod validator;

pub use adjust::{apply_edit, apply_edits, limit_enum, mark_required, remove_property};
pub use draft::UserDraft;
pub use error::{GuidanceError, LoadError, SchemaError, ValidateError};
pub use guidance::{project, project_with};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, render_document, Format,
};
pub use model::{
    Components, Document, InlineSchema, MediaType, Operation, PathItem, Reference, RequestBody,
    Schema, COMPONENT_REF_PREFIX,
};
pub use policy::{
    load_policy_table, resolve, PolicyRule, PolicyTable, RolePredicate,
    IDENTIFICATION_TYPE_SCHEMA, USER_ROLE_SCHEMA, USER_SCHEMA,
};
pub use prune::{prune, prune_to_request_body, reachable_schemas};
pub use select::select;
pub use types::{
    Context, GuidanceOptions, IdentificationType, PolicyEdit, UseCase, UserRole, Verb,
    DEFAULT_PATH,
};
pub use validator::{guidance_schema, validate, validate_against_schema, validate_draft};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
