use uuid::Uuid;

/// Session-derived UI state: the single source of truth for which screens
/// are reachable right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Startup resolution still in flight; no guard decisions yet
    Loading,
    Anonymous,
    /// Signed in, username not yet persisted
    ProfileIncomplete,
    /// Signed in with a complete profile
    Authenticated,
}

/// Screens the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Entry screen with the sign-in/sign-up form
    SignIn,
    UsernameSetup,
    Dashboard,
    CreateRoom,
    Room(Uuid),
}

impl Screen {
    /// Screens that require a complete, authenticated profile
    pub fn is_protected(&self) -> bool {
        matches!(self, Screen::Dashboard | Screen::CreateRoom | Screen::Room(_))
    }

    /// Screens that belong to the sign-in/onboarding flow
    pub fn is_auth_flow(&self) -> bool {
        matches!(self, Screen::SignIn | Screen::UsernameSetup)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Stay,
    Redirect(Screen),
}

/// Outcome of evaluating a navigation attempt.
///
/// `back_intercept` names the screen backward navigation must be rerouted to
/// while the user is on this screen; it is recomputed on every evaluation, so
/// intercepts appear and disappear with the state that justifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routing {
    pub action: NavAction,
    pub back_intercept: Option<Screen>,
}

impl Routing {
    pub fn stay() -> Self {
        Self {
            action: NavAction::Stay,
            back_intercept: None,
        }
    }

    pub fn redirect(screen: Screen) -> Self {
        Self {
            action: NavAction::Redirect(screen),
            back_intercept: None,
        }
    }

    pub fn with_back_intercept(mut self, screen: Screen) -> Self {
        self.back_intercept = Some(screen);
        self
    }
}
