//! Session state machine and route guard.
//!
//! The controller derives one of four states from the identity provider's
//! session and the profile's completeness, and answers, deterministically,
//! which screen a navigation attempt may land on. The embedding view layer
//! forwards session-change notifications (from
//! [`IdentityProvider::watch_session`]) into [`SessionController::apply_session`]
//! and acts on the returned [`Routing`] of every evaluation.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::backend::identity::{Credentials, IdentityProvider, Session};
use crate::backend::records::ProfileRecord;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{SignInDto, SignUpDto};
use crate::features::auth::model::{Routing, Screen, SessionState};
use crate::features::users::dtos::SetUsernameDto;
use crate::features::users::ProfileService;
use crate::modules::navlog::RoomNavlog;

pub struct SessionController {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<ProfileService>,
    navlog: RoomNavlog,
    state: SessionState,
    session: Option<Session>,
}

impl SessionController {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<ProfileService>,
        navlog: RoomNavlog,
    ) -> Self {
        Self {
            identity,
            profiles,
            navlog,
            state: SessionState::Loading,
            session: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Resolve the startup `Loading` state from the current session.
    ///
    /// A session read failure resolves to `Anonymous`: guard failures always
    /// fall toward the least-privileged state rather than aborting startup.
    pub async fn bootstrap(&mut self) {
        let session = match self.identity.current_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Session read failed during startup, treating as signed out: {}", e);
                None
            }
        };
        self.apply_session(session).await;
    }

    /// React to a session transition (sign-in elsewhere, sign-out, expiry).
    ///
    /// Profile completeness is re-probed for a live session; a failed probe
    /// counts as incomplete.
    pub async fn apply_session(&mut self, session: Option<Session>) {
        match session {
            Some(session) => {
                let complete = self.profiles.is_complete(session.user_id).await;
                self.state = if complete {
                    SessionState::Authenticated
                } else {
                    SessionState::ProfileIncomplete
                };
                self.session = Some(session);
            }
            None => {
                self.state = SessionState::Anonymous;
                self.session = None;
            }
        }
    }

    pub async fn sign_up(&mut self, dto: SignUpDto) -> Result<()> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let session = self
            .identity
            .sign_up(Credentials {
                email: dto.email,
                password: dto.password,
            })
            .await?;

        info!("User {} signed up", session.user_id);
        // A fresh account never has a profile yet
        self.session = Some(session);
        self.state = SessionState::ProfileIncomplete;
        Ok(())
    }

    pub async fn sign_in(&mut self, dto: SignInDto) -> Result<()> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let session = self
            .identity
            .sign_in(Credentials {
                email: dto.email,
                password: dto.password,
            })
            .await?;

        self.apply_session(Some(session)).await;
        Ok(())
    }

    /// Persist the username; the only edge from `ProfileIncomplete` to
    /// `Authenticated`.
    pub async fn set_username(&mut self, dto: SetUsernameDto) -> Result<ProfileRecord> {
        let profile = self.profiles.set_username(dto).await?;
        self.state = SessionState::Authenticated;
        Ok(profile)
    }

    pub async fn sign_out(&mut self) -> Result<()> {
        self.identity.sign_out().await?;
        self.state = SessionState::Anonymous;
        self.session = None;
        Ok(())
    }

    /// Track a room this client just created (back-navigation guard)
    pub fn record_room_created(&mut self, room_id: Uuid) {
        self.navlog.record_created(room_id);
    }

    /// Track a room this client just deleted (back-navigation guard)
    pub fn record_room_deleted(&mut self, room_id: Uuid) {
        self.navlog.record_deleted(room_id);
    }

    /// Decide what a navigation attempt to `screen` results in.
    ///
    /// Deterministic in (state, screen, navlog); independent of history depth.
    pub fn evaluate(&self, screen: Screen) -> Routing {
        match self.state {
            SessionState::Loading => Routing::stay(),

            SessionState::Authenticated => {
                if screen.is_auth_flow() {
                    return Routing::redirect(Screen::Dashboard);
                }
                if let Screen::Room(room_id) = screen {
                    if self.navlog.is_flagged(room_id) {
                        // Back must not re-enter a just-created or
                        // just-deleted room
                        return Routing::stay().with_back_intercept(Screen::Dashboard);
                    }
                }
                Routing::stay()
            }

            SessionState::ProfileIncomplete => match screen {
                Screen::UsernameSetup => Routing::stay(),
                _ => Routing::redirect(Screen::UsernameSetup),
            },

            SessionState::Anonymous => match screen {
                Screen::SignIn => Routing::stay(),
                Screen::UsernameSetup => Routing::redirect(Screen::SignIn),
                _ => Routing::redirect(Screen::SignIn).with_back_intercept(Screen::SignIn),
            },
        }
    }
}
