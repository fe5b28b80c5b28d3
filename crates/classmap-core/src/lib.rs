//! Classmap Core Types
//!
//! This crate provides the structural model produced by the classmap
//! extractor and consumed by renderers. It includes:
//!
//! - **Members**: attributes, methods and parameters with their visibility
//!   and direction ([`model::Attribute`], [`model::Method`], [`model::Parameter`])
//! - **Entities**: namespace-scoped classes and enumerations ([`model::Entity`])
//! - **Model**: the ordered result of one extraction run ([`model::StructuralModel`])
//! - **Policies**: extraction knobs shared by the parser and its callers
//!   ([`policy::DefaultValuePolicy`])
//!
//! Every model type implements [`std::fmt::Display`] using UML class diagram
//! notation, so a model can be printed without a dedicated renderer.

pub mod model;
pub mod policy;
