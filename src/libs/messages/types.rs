#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigWizardHeader,
    ConfigSaved,
    ConfigDeleted,
    ConfigNotFound,
    PromptDialect,
    PromptSchemaFile,
    PromptMigrationsDir,
    PromptNumbering,
    PromptIncludeDown,
    PromptQuoteIdentifiers,

    // === SCAFFOLDING MESSAGES ===
    SchemaFileCreated(String),    // path
    SchemaFileExists(String),     // path
    MigrationsDirCreated(String), // path

    // === PIPELINE MESSAGES ===
    SchemasLoaded(usize),      // document count
    LoadWarning(String),       // loader warning text
    ValidationWarning(String), // finding text
    ValidationPassed,
    ValidationFailed(usize), // error count
    NoChangesDetected,
    PendingChanges(usize), // change count

    // === GENERATION MESSAGES ===
    MigrationCreated(String),   // filename
    SnapshotSaved(String),      // path
    DryRunHeader(String),       // filename
    ConfirmDestructive(String), // change description
    CheckChangesPending(usize), // change count
    CheckUpToDate,

    // === STATUS MESSAGES ===
    StatusFirstRun,
    StatusSnapshot(String), // snapshot path
    PendingChangesHeader,
}
