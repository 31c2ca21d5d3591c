//! Every user-facing message of the application.
//!
//! Text lives in [`super::display`]; call sites only pick a variant and pass
//! its parameters.

#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigMissing,
    ConfigModuleHeader(String), // module name
    UserNotConfigured,

    // === PROMPTS (SETUP WIZARD) ===
    PromptSelectModules,
    PromptUserId,
    PromptAlertRepeat,
    PromptAlertRepeatSecs,
    PromptTickMs,
    PromptPollMs,

    // === TASK MESSAGES ===
    TaskCreated(String),          // task name
    TaskFinished(String),         // task name
    TaskNotFound(String),         // reference
    TaskAmbiguous(String, usize), // reference, match count
    TasksNotFound,

    // === TIMER MESSAGES ===
    TimerStarted(String), // task name
    TimerPaused,
    TimerResumed,
    TimerStopped(i64), // overtime seconds
    TimerNotRunning,
    TimerNotPaused,
    NoActiveTask,
    StatusLine(String, String, String), // status, task, readout
    RemoteFailures(u64),

    // === BREAK MESSAGES ===
    BreakStarted,
    BreakExtended,
    BreakFinished,
    BreakSkipped,
    BreakNotAllowed,
    NotOnBreak,
    SettingsSaved,

    // === TIMER PROMPTS ===
    PromptVisible(String),  // prompt label
    PromptLongPause(u32),   // threshold minutes
    PromptBreakDue(u32),    // cadence minutes
    PromptBreakEnd,
    PromptOvertime,
    ChoiceStayPaused,
    ChoiceContinueLater,
    ChoiceContinueNow,
    ChoiceTakeBreak,
    ChoiceSkipBreak,
    ChoiceResumeWork,
    ChoiceExtendBreak,
    ChoiceFinishTask,
    ChoiceKeepGoing,

    // === WATCH MESSAGES ===
    WatchStarted,
    WatchStopped,

    // === HISTORY MESSAGES ===
    TimeLogsHeader,
    BreaksHeader,
    NoTimeLogsRecorded,
    NoBreaksRecorded,

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),        // count
    RunningMigration(u32, String), // version, name
    MigrationFailed(u32, String),  // version, error
    MigrationsCompleted(u32),      // version
}
