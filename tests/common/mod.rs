//! Shared test support: a scripted [`CommandRunner`].
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use wifi_provision::command::CommandRunner;
use wifi_provision::models::ProvisionError;

/// One scripted reply for a command template.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(&'static str),
    Fail(&'static str),
}

/// A recorded invocation: the command text and its environment bindings.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: String,
    pub env: Vec<(String, String)>,
}

/// A [`CommandRunner`] that replays scripted replies and records every
/// invocation.
///
/// Replies are keyed by exact command template and consumed in order; the
/// last reply in a script is sticky, so `[Ok("DISCONNECTED")]` models a
/// status that never changes. Unscripted commands fail, which surfaces any
/// unexpected invocation as a test failure.
#[derive(Default)]
pub struct ScriptedRunner {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    log: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, command: &str, replies: Vec<Reply>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(command.to_string(), replies.into());
    }

    /// All invocations so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.log.lock().unwrap().clone()
    }

    /// How many times the given template has been run.
    pub fn count(&self, command: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.command == command)
            .count()
    }

    /// Position of the first invocation of the given template, if any.
    pub fn position(&self, command: &str) -> Option<usize> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .position(|i| i.command == command)
    }

    /// Environment bindings of the first invocation of the given template.
    pub fn env_of(&self, command: &str) -> Option<Vec<(String, String)>> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.command == command)
            .map(|i| i.env.clone())
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str, env: &[(&str, &str)]) -> wifi_provision::Result<String> {
        self.log.lock().unwrap().push(Invocation {
            command: command.to_string(),
            env: env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(command) {
                Some(queue) => {
                    if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    }
                }
                None => None,
            }
        };

        match reply {
            Some(Reply::Ok(out)) => Ok(out.to_string()),
            Some(Reply::Fail(detail)) => Err(ProvisionError::CommandFailed {
                command: command.to_string(),
                detail: detail.to_string(),
            }),
            None => Err(ProvisionError::CommandFailed {
                command: command.to_string(),
                detail: "unscripted command".to_string(),
            }),
        }
    }
}
