//! The embeddable wallet session: the host-facing event bindings plus the
//! async driver around the pure sequencer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::{
    environment::probe_wallet,
    error::SessionError,
    provider::{locate_wallet, ProviderError, WalletProvider},
    sequencer::{Effect, Event, Phase, Sequencer},
    store::{SessionStore, AUTH_MESSAGE_KEY, PENDING_FLAG_KEY, PENDING_FLAG_VALUE},
    ui::UiState,
};

/// Default delay before a failed connect label reverts.
pub const REVERT_DELAY_MS: u64 = 3_000;

/// Default delay before the pending-prompt deep link navigates away.
pub const DEEP_LINK_DELAY_MS: u64 = 1_000;

/// Static facts about the hosting page, captured once at startup.
#[derive(Debug, Clone, uniffi::Record)]
pub struct SessionConfig {
    /// Browser user agent string.
    pub user_agent: String,
    /// Host part of the page URL, used in the deep link.
    pub page_host: String,
    /// Path part of the page URL, used in the deep link.
    pub page_path: String,
    /// Site name embedded in the signature payload.
    pub site_name: String,
    /// Whether the flow requests a signature after connecting.
    pub require_signature: bool,
    /// Whether the connect button exists on the page.
    pub connect_button_present: bool,
    /// Whether the signing/request library is loaded on the page.
    pub signer_library_present: bool,
    /// Delay before a failure label auto-reverts, in milliseconds.
    pub revert_delay_ms: u64,
    /// Delay before the pending-prompt deep link fires, in milliseconds.
    pub deep_link_delay_ms: u64,
}

/// Builds a [`SessionConfig`] with the stock delays and both host
/// prerequisites assumed present.
#[uniffi::export]
#[must_use]
#[allow(clippy::missing_const_for_fn)]
pub fn session_config(
    user_agent: String,
    page_host: String,
    page_path: String,
    site_name: String,
    require_signature: bool,
) -> SessionConfig {
    SessionConfig {
        user_agent,
        page_host,
        page_path,
        site_name,
        require_signature,
        connect_button_present: true,
        signer_library_present: true,
        revert_delay_ms: REVERT_DELAY_MS,
        deep_link_delay_ms: DEEP_LINK_DELAY_MS,
    }
}

/// Intents a session call hands back to the host page.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum HostEffect {
    /// Apply a full UI snapshot to the four reflected elements.
    Render {
        /// The snapshot to apply.
        ui: UiState,
    },
    /// Call [`WalletSession::on_revert_elapsed`] after the delay.
    ScheduleRevert {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Call [`WalletSession::on_deep_link_elapsed`] after the delay.
    ScheduleDeepLink {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Perform a full page navigation (not a network call).
    Navigate {
        /// Absolute URL to navigate to.
        url: String,
    },
}

/// An embeddable connect/authenticate session for one page.
///
/// The host forwards its events (`initialize` on load, the button click,
/// the provider's account-change push, visibility restoration and the two
/// scheduled timers) and applies the returned [`HostEffect`]s in order.
/// All provider and store traffic happens inside the call; a failed
/// provider call never escapes as an error, it is logged and reflected as
/// a UI label.
#[derive(uniffi::Object)]
pub struct WalletSession {
    config: SessionConfig,
    provider: Option<Arc<dyn WalletProvider>>,
    store: Arc<dyn SessionStore>,
    sequencer: Mutex<Sequencer>,
}

#[uniffi::export]
impl WalletSession {
    /// Creates a session over the host's provider reference (if any) and
    /// session store.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(
        config: SessionConfig,
        provider: Option<Arc<dyn WalletProvider>>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let sequencer = Mutex::new(Sequencer::new(&config));
        Self {
            config,
            provider,
            store,
            sequencer,
        }
    }

    /// Runs the initialization sequence for the page load.
    ///
    /// If the deep-link round-trip flag is set it is cleared and the full
    /// connect(+sign) sequence runs immediately, short-circuiting the
    /// installed/not-installed check. `now_ms` overrides the clock used
    /// for the signature payload; pass `None` outside of tests.
    ///
    /// # Errors
    /// Returns [`SessionError::MissingElement`] if the connect button is
    /// absent. Nothing else aborts initialization; a missing signing
    /// library disables the session but still renders.
    pub async fn initialize(
        &self,
        now_ms: Option<u64>,
    ) -> Result<Vec<HostEffect>, SessionError> {
        if !self.config.connect_button_present {
            log::error!("connect wallet button not found in page");
            return Err(SessionError::MissingElement {
                id: "connectWallet".to_owned(),
            });
        }

        let mut seq = self.sequencer.lock().await;
        if !self.config.signer_library_present {
            log::error!("signing library not loaded; wallet integration disabled");
            seq.mark_unusable();
            return Ok(vec![HostEffect::Render {
                ui: UiState::signer_missing(),
            }]);
        }

        let now_ms = resolve_now(now_ms)?;
        let pending_flag = self.pending_flag_set();
        let availability = probe_wallet(self.provider.clone());
        Ok(self
            .drive(
                &mut seq,
                Event::Started {
                    pending_flag,
                    availability,
                    now_ms,
                },
            )
            .await)
    }

    /// Handles a click on the connect button.
    ///
    /// # Errors
    /// Fails only if the system clock is unusable and no `now_ms`
    /// override was given.
    pub async fn on_connect_click(
        &self,
        now_ms: Option<u64>,
    ) -> Result<Vec<HostEffect>, SessionError> {
        let now_ms = resolve_now(now_ms)?;
        let mut seq = self.sequencer.lock().await;
        Ok(self.drive(&mut seq, Event::ConnectClicked { now_ms }).await)
    }

    /// Handles the provider's account-change push notification.
    pub async fn on_accounts_changed(&self, accounts: Vec<String>) -> Vec<HostEffect> {
        let mut seq = self.sequencer.lock().await;
        self.drive(&mut seq, Event::AccountsChanged { accounts })
            .await
    }

    /// Handles the page becoming visible again after the wallet-app
    /// round trip.
    ///
    /// # Errors
    /// Fails only if the system clock is unusable and no `now_ms`
    /// override was given.
    pub async fn on_page_visible(
        &self,
        now_ms: Option<u64>,
    ) -> Result<Vec<HostEffect>, SessionError> {
        let now_ms = resolve_now(now_ms)?;
        let pending_flag = self.pending_flag_set();
        let mut seq = self.sequencer.lock().await;
        Ok(self
            .drive(
                &mut seq,
                Event::PageVisible {
                    pending_flag,
                    now_ms,
                },
            )
            .await)
    }

    /// Handles the failure label's revert timer.
    pub async fn on_revert_elapsed(&self) -> Vec<HostEffect> {
        let mut seq = self.sequencer.lock().await;
        self.drive(&mut seq, Event::RevertElapsed).await
    }

    /// Handles the scheduled deep-link timer.
    pub async fn on_deep_link_elapsed(&self) -> Vec<HostEffect> {
        let mut seq = self.sequencer.lock().await;
        self.drive(&mut seq, Event::DeepLinkElapsed).await
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> Phase {
        self.sequencer.lock().await.phase()
    }
}

impl WalletSession {
    /// Locates the target wallet for this call. Re-evaluated on every
    /// call; nothing is cached.
    fn wallet(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone().map(locate_wallet)
    }

    fn pending_flag_set(&self) -> bool {
        match self.store.get(PENDING_FLAG_KEY.to_owned()) {
            Ok(value) => value.as_deref() == Some(PENDING_FLAG_VALUE),
            Err(error) => {
                log::warn!("session store read failed: {error}");
                false
            }
        }
    }

    /// Feeds `event` through the sequencer, executing provider and store
    /// intents inline and collecting the host-facing remainder in order.
    async fn drive(&self, seq: &mut Sequencer, event: Event) -> Vec<HostEffect> {
        let mut queue = VecDeque::from([event]);
        let mut host = Vec::new();

        while let Some(event) = queue.pop_front() {
            for effect in seq.handle(event) {
                match effect {
                    Effect::Render(ui) => host.push(HostEffect::Render { ui }),
                    Effect::ScheduleRevert { delay_ms } => {
                        host.push(HostEffect::ScheduleRevert { delay_ms });
                    }
                    Effect::ScheduleDeepLink { delay_ms } => {
                        host.push(HostEffect::ScheduleDeepLink { delay_ms });
                    }
                    Effect::Navigate { url } => {
                        host.push(HostEffect::Navigate { url });
                    }
                    Effect::RequestAccounts => {
                        queue.push_back(self.request_accounts().await);
                    }
                    Effect::ListAccounts => {
                        queue.push_back(self.list_accounts().await);
                    }
                    Effect::RequestSignature { account, message } => {
                        queue.push_back(self.request_signature(account, message).await);
                    }
                    Effect::StashAuthMessage { message } => {
                        if let Err(error) =
                            self.store.set(AUTH_MESSAGE_KEY.to_owned(), message)
                        {
                            log::warn!("failed to stash auth message: {error}");
                        }
                    }
                    Effect::SetPendingFlag => {
                        if let Err(error) = self
                            .store
                            .set(PENDING_FLAG_KEY.to_owned(), PENDING_FLAG_VALUE.to_owned())
                        {
                            log::warn!("failed to set pending flag: {error}");
                        }
                    }
                    Effect::ClearPendingFlag => {
                        if let Err(error) = self.store.remove(PENDING_FLAG_KEY.to_owned())
                        {
                            log::warn!("failed to clear pending flag: {error}");
                        }
                    }
                }
            }
        }

        log::debug!("session now in phase {}", seq.phase());
        host
    }

    async fn request_accounts(&self) -> Event {
        let Some(wallet) = self.wallet() else {
            log::error!("no wallet provider available for account request");
            return Event::ConnectErrored { pending: false };
        };
        match wallet.request_accounts().await {
            Ok(accounts) => Event::AccountsGranted { accounts },
            Err(error) => {
                log::error!("error connecting to wallet: {error}");
                Event::ConnectErrored {
                    pending: matches!(error, ProviderError::RequestPending),
                }
            }
        }
    }

    async fn list_accounts(&self) -> Event {
        let Some(wallet) = self.wallet() else {
            log::error!("no wallet provider available for account listing");
            return Event::ListFailed;
        };
        match wallet.list_accounts().await {
            Ok(accounts) => Event::AccountsListed { accounts },
            Err(error) => {
                log::error!("error checking connection: {error}");
                Event::ListFailed
            }
        }
    }

    async fn request_signature(&self, account: String, message: String) -> Event {
        let Some(wallet) = self.wallet() else {
            log::error!("no wallet provider available for signing");
            return Event::SignatureDenied;
        };
        match wallet.sign_message(account.clone(), message).await {
            Ok(signature) => {
                log::info!("authentication successful for {account}");
                Event::SignatureGranted { account, signature }
            }
            Err(error) => {
                log::error!("error during signature: {error}");
                Event::SignatureDenied
            }
        }
    }
}

fn resolve_now(now_ms: Option<u64>) -> Result<u64, SessionError> {
    if let Some(now) = now_ms {
        return Ok(now);
    }
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| SessionError::Generic {
            error: format!("unable to determine system time: {e}"),
        })?
        .as_millis();
    u64::try_from(millis).map_err(|e| SessionError::Generic {
        error: format!("system time out of range: {e}"),
    })
}
