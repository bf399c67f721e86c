// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::forms::{FormDraft, FormPayload};
use crate::{AppMode, EntityKind, FormKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_screen: EntityKind,
    pub status_line: Option<String>,
    pub form: Option<FormDraft>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_screen: EntityKind::Engagements,
            status_line: None,
            form: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextScreen,
    PrevScreen,
    SetActiveScreen(EntityKind),
    OpenSearch,
    ExitToNav,
    OpenForm(FormKind),
    SubmitForm,
    CancelForm,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ScreenChanged(EntityKind),
    FormSubmitted(FormKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextScreen => self.rotate_screen(1),
            AppCommand::PrevScreen => self.rotate_screen(-1),
            AppCommand::SetActiveScreen(screen) => {
                if self.active_screen == screen {
                    return Vec::new();
                }
                self.active_screen = screen;
                vec![AppEvent::ScreenChanged(screen)]
            }
            AppCommand::OpenSearch => {
                self.mode = AppMode::Search;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                self.form = None;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::OpenForm(kind) => {
                self.mode = AppMode::Form(kind);
                self.form = Some(FormDraft::new(kind));
                vec![
                    AppEvent::ModeChanged(self.mode),
                    self.set_status(&format!("add {}", kind.label())),
                ]
            }
            AppCommand::SubmitForm => {
                let Some(draft) = self.form.take() else {
                    return Vec::new();
                };
                self.mode = AppMode::Nav;
                let kind = draft.kind();
                vec![
                    AppEvent::FormSubmitted(kind),
                    AppEvent::ModeChanged(self.mode),
                    self.set_status(&format!("{} saved", kind.label())),
                ]
            }
            AppCommand::CancelForm => {
                self.form = None;
                self.mode = AppMode::Nav;
                vec![
                    AppEvent::ModeChanged(self.mode),
                    self.set_status("form canceled"),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut FormDraft> {
        self.form.as_mut()
    }

    /// Parses and validates the open form without closing it.
    pub fn validated_form_payload(&self) -> Result<FormPayload> {
        let Some(draft) = &self.form else {
            bail!("no form is open -- press a to add a record");
        };
        let payload = draft.to_payload()?;
        payload.validate()?;
        Ok(payload)
    }

    fn rotate_screen(&mut self, delta: isize) -> Vec<AppEvent> {
        let screens = EntityKind::ALL;
        let current = screens
            .iter()
            .position(|screen| *screen == self.active_screen)
            .unwrap_or(0) as isize;
        let len = screens.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_screen = screens[next];
        vec![AppEvent::ScreenChanged(self.active_screen)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
