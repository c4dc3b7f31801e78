//! Guided form-filling dialog engine.
//!
//! Leaf-first: field registry (`field`), slots (`record`), validation,
//! input recognition, steps, the compiler (`builder`, `schema`) and the
//! per-session runtime.

mod builder;
mod dialog;
mod errors;
mod field;
mod input;
mod record;
mod runtime;
mod schema;
mod state;
mod step;
mod templates;
mod validation;

pub use builder::{compile, FormBuilder, PlannedStep};
pub use dialog::{CompiledDialog, CompletionCallback};
pub use errors::{FormError, ProcessingFault, SchemaError};
pub use field::{
    humanize, ChoiceOption, FieldCondition, FieldDescriptor, FieldKind, FieldValue, TextPattern,
    ValidatorRef,
};
pub use input::{Command, InputVocabulary, Recognition};
pub use record::{OrderRecord, Slot};
pub use runtime::{FormSession, TurnOutcome};
pub use schema::{
    compile_from_schema, SchemaConfirm, SchemaDocument, SchemaField, SchemaFormat,
    SchemaMessages,
};
pub use state::DialogState;
pub use step::{ConfirmStep, PromptFn, Step};
pub use templates::{ids as template_ids, render, render_display, render_prompt, FormTemplates};
pub use validation::{validate_value, CustomValidator, ValidationResult};
