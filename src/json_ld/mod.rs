//! Just enough JSON-LD to describe API resources.

mod context;
pub(crate) mod vocab;

pub(crate) use self::context::JsonLdContext;
pub(crate) use self::vocab::TermDefinition;
