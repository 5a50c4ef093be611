//! Workspace layout and persisted configuration.

mod config;

pub use config::{
    config_dir, config_file_path, ensure_workspace_structure, load_or_default, save,
    workspace_root, AppConfig, CompletionSettings, MailTransportKind, NotificationSettings,
    QuizSettings, StorageSettings, WorkspacePaths, CONFIG_FILE_NAME,
};
