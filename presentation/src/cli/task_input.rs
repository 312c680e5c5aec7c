//! Building a [`Task`] from command line arguments

use super::commands::TaskArgs;
use conductor_domain::Task;
use std::path::{Path, PathBuf};
use thiserror::Error;

const INLINE_TASK_ID: &str = "cli-task";

#[derive(Error, Debug)]
pub enum TaskInputError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid task file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("--type is required when no task file is given")]
    MissingType,

    #[error("--input or --input-file is required when no task file is given")]
    MissingInput,
}

impl TaskArgs {
    /// Load the task file (if any) and apply the inline flags on top
    pub fn build_task(&self) -> Result<Task, TaskInputError> {
        let input = self.inline_input()?;

        let mut task = match &self.file {
            Some(path) => read_task_file(path)?,
            None => {
                let task_type = self.task_type.ok_or(TaskInputError::MissingType)?;
                let input = input.clone().ok_or(TaskInputError::MissingInput)?;
                Task::new(INLINE_TASK_ID, task_type, input)
            }
        };

        if let Some(task_type) = self.task_type {
            task.task_type = task_type;
        }
        if let Some(id) = &self.id {
            task.id = id.as_str().into();
        }
        if let Some(input) = input {
            task.input = input.into();
        }
        if let Some(quality) = self.quality {
            task = task.with_quality(quality);
        }
        if let Some(speed) = self.speed {
            task = task.with_speed(speed);
        }
        if let Some(depth) = self.depth {
            task = task.with_depth(depth);
        }
        if let Some(min_confidence) = self.min_confidence {
            task = task.with_min_confidence(min_confidence);
        }

        Ok(task)
    }

    fn inline_input(&self) -> Result<Option<String>, TaskInputError> {
        match (&self.input, &self.input_file) {
            (Some(text), _) => Ok(Some(text.clone())),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(Some)
                .map_err(|source| TaskInputError::Read {
                    path: path.clone(),
                    source,
                }),
            (None, None) => Ok(None),
        }
    }
}

fn read_task_file(path: &Path) -> Result<Task, TaskInputError> {
    let content = std::fs::read_to_string(path).map_err(|source| TaskInputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| TaskInputError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_domain::{SpeedPreference, TaskType};
    use serde_json::json;

    #[test]
    fn test_inline_task() {
        let args = TaskArgs {
            task_type: Some(TaskType::Security),
            quality: Some(95),
            input: Some("eval(x)".to_string()),
            ..Default::default()
        };
        let task = args.build_task().unwrap();
        assert_eq!(task.id.as_str(), "cli-task");
        assert_eq!(task.task_type, TaskType::Security);
        assert_eq!(task.input, json!("eval(x)"));
        assert_eq!(task.requirements.quality, Some(95));
    }

    #[test]
    fn test_inline_task_needs_type_and_input() {
        let args = TaskArgs {
            input: Some("x".to_string()),
            ..Default::default()
        };
        assert!(matches!(args.build_task(), Err(TaskInputError::MissingType)));

        let args = TaskArgs {
            task_type: Some(TaskType::Testing),
            ..Default::default()
        };
        assert!(matches!(args.build_task(), Err(TaskInputError::MissingInput)));
    }

    #[test]
    fn test_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.json");
        std::fs::write(
            &path,
            r#"{"id": "t-7", "type": "analysis", "input": {"code": "fn a() {}"}, "requirements": {"quality": 70}}"#,
        )
        .unwrap();

        let args = TaskArgs {
            file: Some(path),
            speed: Some(SpeedPreference::Fast),
            quality: Some(90),
            ..Default::default()
        };
        let task = args.build_task().unwrap();
        assert_eq!(task.id.as_str(), "t-7");
        assert_eq!(task.task_type, TaskType::Analysis);
        assert_eq!(task.input, json!({"code": "fn a() {}"}));
        assert_eq!(task.requirements.quality, Some(90));
        assert_eq!(task.requirements.speed, Some(SpeedPreference::Fast));
    }

    #[test]
    fn test_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("lib.rs");
        std::fs::write(&source, "fn main() {}").unwrap();

        let args = TaskArgs {
            task_type: Some(TaskType::Analysis),
            input_file: Some(source),
            ..Default::default()
        };
        assert_eq!(args.build_task().unwrap().input, json!("fn main() {}"));
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let args = TaskArgs {
            file: Some(path),
            ..Default::default()
        };
        let err = args.build_task().unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
