//! Extension points
//!
//! Hooks are ordered lists of callbacks, invoked synchronously once per
//! event in registration order. Filters receive the output of the previous
//! filter. None of them can change the pipeline's control flow: a filter can
//! replace the value about to be written, an observer can only look.
//!
//! | Hook | Kind | Fired |
//! |------|------|-------|
//! | import value | filter | before each write, after the prior value is buffered |
//! | export value | filter | for each exported value, after shaping |
//! | shaping types | filter | whenever a read decides raw vs shaped |
//! | field imported / failed | observer | after each import write |
//! | rollback field complete / failed | observer | after each compensating write |
//! | before / after rollback | observer | around a rollback replay |
//! | import started / completed / failed | observer | around a whole import |
//! | export started / finished | observer | around a whole export |

use crate::exporter::ExportSelection;
use crate::rollback::{RollbackBuffer, RollbackSummary};
use fieldsnap_core::{FieldDefinition, FieldType, OwnerKind, OwnerRef, SnapshotDocument, Value};
use std::fmt;

/// Where a value is being read or written
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Owner kind (`post`, `taxonomy`, `user`, `comment`, `option`)
    pub kind: OwnerKind,
    /// Group the field was found in
    pub group_key: &'a str,
    /// Field name
    pub field_name: &'a str,
    /// Owner the value belongs to
    pub owner: &'a OwnerRef,
    /// Post type (posts, comments) or taxonomy (terms) bucket
    pub bucket: Option<&'a str>,
    /// Field definition at this owner, if known
    pub definition: Option<&'a FieldDefinition>,
}

type ValueFilter = Box<dyn Fn(Value, &Value, &FieldContext<'_>) -> Value>;
type ExportFilter = Box<dyn Fn(Value, &FieldContext<'_>) -> Value>;
type ShapingFilter = Box<dyn Fn(Vec<FieldType>, &FieldDefinition) -> Vec<FieldType>>;
type ValueObserver = Box<dyn Fn(&FieldContext<'_>, &Value)>;
type FailureObserver = Box<dyn Fn(&FieldContext<'_>, &Value, &Value)>;
type BufferObserver = Box<dyn Fn(&RollbackBuffer)>;
type SummaryObserver = Box<dyn Fn(&RollbackSummary)>;
type DocumentObserver = Box<dyn Fn(&SnapshotDocument)>;
type Notifier = Box<dyn Fn()>;
type SelectionObserver = Box<dyn Fn(&ExportSelection)>;
type ExportObserver = Box<dyn Fn(&ExportSelection, &SnapshotDocument)>;

/// Registry of every extension point
#[derive(Default)]
pub struct Hooks {
    import_filters: Vec<ValueFilter>,
    export_filters: Vec<ExportFilter>,
    shaping_filters: Vec<ShapingFilter>,
    field_imported: Vec<ValueObserver>,
    field_failed: Vec<FailureObserver>,
    rollback_complete: Vec<ValueObserver>,
    rollback_failed: Vec<FailureObserver>,
    before_rollback: Vec<BufferObserver>,
    after_rollback: Vec<SummaryObserver>,
    import_started: Vec<DocumentObserver>,
    import_completed: Vec<Notifier>,
    import_failed: Vec<Notifier>,
    export_started: Vec<SelectionObserver>,
    export_finished: Vec<ExportObserver>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("import_filters", &self.import_filters.len())
            .field("export_filters", &self.export_filters.len())
            .field("shaping_filters", &self.shaping_filters.len())
            .field("field_imported", &self.field_imported.len())
            .field("field_failed", &self.field_failed.len())
            .field("rollback_complete", &self.rollback_complete.len())
            .field("rollback_failed", &self.rollback_failed.len())
            .field("before_rollback", &self.before_rollback.len())
            .field("after_rollback", &self.after_rollback.len())
            .field("import_started", &self.import_started.len())
            .field("import_completed", &self.import_completed.len())
            .field("import_failed", &self.import_failed.len())
            .field("export_started", &self.export_started.len())
            .field("export_finished", &self.export_finished.len())
            .finish()
    }
}

impl Hooks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Registration ==========

    /// Transform a value before it is imported
    ///
    /// Arguments: incoming value, existing value, context.
    pub fn add_import_filter<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Value, &Value, &FieldContext<'_>) -> Value + 'static,
    {
        self.import_filters.push(Box::new(f));
        self
    }

    /// Transform a value before it is exported
    pub fn add_export_filter<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Value, &FieldContext<'_>) -> Value + 'static,
    {
        self.export_filters.push(Box::new(f));
        self
    }

    /// Change which field types are read in shaped form
    pub fn add_shaping_filter<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Vec<FieldType>, &FieldDefinition) -> Vec<FieldType> + 'static,
    {
        self.shaping_filters.push(Box::new(f));
        self
    }

    /// Observe successful import writes (context, written value)
    pub fn on_field_imported<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&FieldContext<'_>, &Value) + 'static,
    {
        self.field_imported.push(Box::new(f));
        self
    }

    /// Observe failed import writes (context, attempted value, existing value)
    pub fn on_field_failed<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&FieldContext<'_>, &Value, &Value) + 'static,
    {
        self.field_failed.push(Box::new(f));
        self
    }

    /// Observe successful compensating writes (context, restored value)
    pub fn on_rollback_field_complete<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&FieldContext<'_>, &Value) + 'static,
    {
        self.rollback_complete.push(Box::new(f));
        self
    }

    /// Observe failed compensating writes (context, prior value, current value)
    pub fn on_rollback_field_failed<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&FieldContext<'_>, &Value, &Value) + 'static,
    {
        self.rollback_failed.push(Box::new(f));
        self
    }

    /// Observe the buffer right before a rollback replays it
    pub fn on_before_rollback<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&RollbackBuffer) + 'static,
    {
        self.before_rollback.push(Box::new(f));
        self
    }

    /// Observe the result of a rollback replay
    pub fn on_after_rollback<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&RollbackSummary) + 'static,
    {
        self.after_rollback.push(Box::new(f));
        self
    }

    /// Observe a parsed document before its import starts
    pub fn on_import_started<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&SnapshotDocument) + 'static,
    {
        self.import_started.push(Box::new(f));
        self
    }

    /// Observe a successful import
    pub fn on_import_completed<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() + 'static,
    {
        self.import_completed.push(Box::new(f));
        self
    }

    /// Observe a failed import
    pub fn on_import_failed<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() + 'static,
    {
        self.import_failed.push(Box::new(f));
        self
    }

    /// Observe the start of an export
    pub fn on_export_started<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&ExportSelection) + 'static,
    {
        self.export_started.push(Box::new(f));
        self
    }

    /// Observe a finished export and the document it built
    pub fn on_export_finished<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&ExportSelection, &SnapshotDocument) + 'static,
    {
        self.export_finished.push(Box::new(f));
        self
    }

    // ========== Invocation ==========

    pub(crate) fn filter_import_value(
        &self,
        value: Value,
        existing: &Value,
        ctx: &FieldContext<'_>,
    ) -> Value {
        self.import_filters
            .iter()
            .fold(value, |v, f| f(v, existing, ctx))
    }

    pub(crate) fn filter_export_value(&self, value: Value, ctx: &FieldContext<'_>) -> Value {
        self.export_filters.iter().fold(value, |v, f| f(v, ctx))
    }

    pub(crate) fn filter_shaping_types(
        &self,
        types: Vec<FieldType>,
        definition: &FieldDefinition,
    ) -> Vec<FieldType> {
        self.shaping_filters
            .iter()
            .fold(types, |t, f| f(t, definition))
    }

    pub(crate) fn notify_field_imported(&self, ctx: &FieldContext<'_>, value: &Value) {
        self.field_imported.iter().for_each(|f| f(ctx, value));
    }

    pub(crate) fn notify_field_failed(&self, ctx: &FieldContext<'_>, value: &Value, existing: &Value) {
        self.field_failed.iter().for_each(|f| f(ctx, value, existing));
    }

    pub(crate) fn notify_rollback_complete(&self, ctx: &FieldContext<'_>, value: &Value) {
        self.rollback_complete.iter().for_each(|f| f(ctx, value));
    }

    pub(crate) fn notify_rollback_failed(&self, ctx: &FieldContext<'_>, prior: &Value, current: &Value) {
        self.rollback_failed.iter().for_each(|f| f(ctx, prior, current));
    }

    pub(crate) fn notify_before_rollback(&self, buffer: &RollbackBuffer) {
        self.before_rollback.iter().for_each(|f| f(buffer));
    }

    pub(crate) fn notify_after_rollback(&self, summary: &RollbackSummary) {
        self.after_rollback.iter().for_each(|f| f(summary));
    }

    pub(crate) fn notify_import_started(&self, document: &SnapshotDocument) {
        self.import_started.iter().for_each(|f| f(document));
    }

    pub(crate) fn notify_import_finished(&self, success: bool) {
        let observers = if success {
            &self.import_completed
        } else {
            &self.import_failed
        };
        observers.iter().for_each(|f| f());
    }

    pub(crate) fn notify_export_started(&self, selection: &ExportSelection) {
        self.export_started.iter().for_each(|f| f(selection));
    }

    pub(crate) fn notify_export_finished(&self, selection: &ExportSelection, document: &SnapshotDocument) {
        self.export_finished.iter().for_each(|f| f(selection, document));
    }
}
