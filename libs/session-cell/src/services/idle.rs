use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, info, instrument, warn};

use shared_database::{ClientError, InFlightCounter, SupabaseClient};
use shared_models::auth::Session;

use crate::models::{IdleEvent, IdleSettings, IdleState};
use crate::services::clock::{ActivityClock, ClockTransition};

/// Ends the session on the auth provider's side.
#[async_trait]
pub trait SessionTerminator: Send + Sync {
    async fn sign_out(&self, access_token: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl SessionTerminator for SupabaseClient {
    async fn sign_out(&self, access_token: &str) -> Result<(), ClientError> {
        SupabaseClient::sign_out(self, access_token).await
    }
}

#[derive(Debug)]
enum Command {
    Input,
    StayActive,
    Teardown,
}

pub struct IdleMonitor;

impl IdleMonitor {
    /// Starts watching for inactivity. Without a session nothing is spawned
    /// and `None` comes back.
    pub fn arm(
        session: Option<&Session>,
        settings: IdleSettings,
        in_flight: InFlightCounter,
        terminator: Arc<dyn SessionTerminator>,
    ) -> Option<IdleHandle> {
        let session = session?.clone();

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let clock = ActivityClock::new(settings, in_flight, Instant::now());
        info!("Idle monitor armed for user {}", session.user.id);

        let task = tokio::spawn(run(clock, session, terminator, command_rx, event_tx));

        Some(IdleHandle {
            commands: command_tx,
            events: event_rx,
            task,
        })
    }
}

/// Owned by whatever holds the authenticated view. Dropping it stops the
/// monitor.
pub struct IdleHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<IdleEvent>,
    task: JoinHandle<()>,
}

impl IdleHandle {
    /// Any qualifying user input: pointer, key, scroll, touch.
    pub fn record_input(&self) {
        let _ = self.commands.send(Command::Input);
    }

    pub fn stay_active(&self) {
        let _ = self.commands.send(Command::StayActive);
    }

    /// Waits for the next warning or logout. `None` once the monitor has
    /// stopped and every event has been read.
    pub async fn next_event(&mut self) -> Option<IdleEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<IdleEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancels both deadlines and waits for the monitor to stop.
    pub async fn teardown(mut self) {
        let _ = self.commands.send(Command::Teardown);
        let _ = (&mut self.task).await;
    }
}

impl Drop for IdleHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[instrument(skip_all, fields(user_id = %session.user.id))]
async fn run(
    mut clock: ActivityClock,
    session: Session,
    terminator: Arc<dyn SessionTerminator>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<IdleEvent>,
) {
    while let Some((deadline, at)) = clock.next_deadline() {
        let was_warning = clock.state() == IdleState::WarningShown;

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Input) => {
                    if clock.record_input(Instant::now()) {
                        debug!("Activity clock reset by input");
                    }
                }
                Some(Command::StayActive) => {
                    debug!("User chose to stay signed in");
                    clock.stay_active(Instant::now());
                }
                Some(Command::Teardown) | None => {
                    debug!("Idle monitor torn down");
                    return;
                }
            },
            _ = sleep_until(at) => match clock.fire(deadline, Instant::now()) {
                ClockTransition::Deferred => {
                    debug!("Idle deadline reached with calls in flight, treating as activity");
                }
                ClockTransition::WarningShown => {
                    let settings = clock.settings();
                    let logout_in = settings.logout_after.saturating_sub(settings.warning_after);
                    info!("Idle warning shown, logout in {:?}", logout_in);
                    let _ = events.send(IdleEvent::WarningShown { logout_in });
                }
                ClockTransition::LoggedOut => {
                    warn!("Session idle, forcing logout");
                    let settings = clock.settings();
                    let sign_out = terminator.sign_out(&session.access_token);
                    match timeout(settings.sign_out_timeout, sign_out).await {
                        Ok(Ok(())) => debug!("Session signed out"),
                        Ok(Err(e)) => warn!("Sign-out during idle logout failed: {}", e),
                        Err(_) => warn!(
                            "Sign-out during idle logout timed out after {:?}",
                            settings.sign_out_timeout
                        ),
                    }
                    let _ = events.send(IdleEvent::LoggedOut {
                        redirect_to: settings.auth_entry_point.clone(),
                    });
                }
            },
        }

        if was_warning && clock.state() == IdleState::Active {
            debug!("Idle warning dismissed");
            let _ = events.send(IdleEvent::WarningDismissed);
        }
    }
}
