//! The connection/authentication sequencer.
//!
//! A pure state machine: page and provider events come in as [`Event`]
//! values, intents come out as [`Effect`] values. The driver in
//! [`crate::session`] executes provider and store intents and feeds the
//! results back in; render, timer and navigation intents pass through to
//! the host. Keeping the transition function synchronous makes every
//! transition testable without a browser.

use strum::Display;

use crate::{
    deep_link::{auth_message, deep_link_url},
    environment::{is_mobile, WalletAvailability},
    session::SessionConfig,
    ui::UiState,
};

/// Connection lifecycle phase.
#[derive(Debug, Clone, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// No connection attempt in progress.
    Idle,
    /// An account prompt is in flight.
    Requesting,
    /// Accounts granted; no signature yet (or it was declined).
    Connected {
        /// The active account address.
        account: String,
    },
    /// A signature request is in flight.
    SigningRequested {
        /// The account asked to sign.
        account: String,
        /// Whether this is the sign-only retry rather than the
        /// connect-and-sign flow.
        retry: bool,
    },
    /// Connection and message signature both completed.
    Authenticated {
        /// The authenticated account address.
        account: String,
        /// Signature returned by the wallet.
        signature: String,
    },
    /// A connect attempt failed; the label reverts on a timer.
    ConnectFailed,
    /// A required host dependency is missing; all events are ignored.
    Unusable,
}

/// What a click on the connect button currently does.
///
/// Single source of truth for the button binding: rebinding is a state
/// change here, never an additional event listener on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum ClickAction {
    /// Run the account prompt (and signature, in that variant).
    Connect,
    /// Deep-link into the wallet's mobile app.
    OpenWalletApp,
    /// Retry only the signature against the connected account.
    SignOnly,
}

/// Explicit inputs to the transition function.
///
/// Host event listeners (click, account change, visibility) and the
/// driver's completed provider calls all arrive through here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Page load finished; availability and the round-trip flag are known.
    Started {
        /// Whether the deep-link round-trip flag was set (already read
        /// from the session store by the driver).
        pending_flag: bool,
        /// Result of the wallet capability probe.
        availability: WalletAvailability,
        /// Current time in milliseconds, for the signature payload.
        now_ms: u64,
    },
    /// The connect button was clicked.
    ConnectClicked {
        /// Current time in milliseconds, for the signature payload.
        now_ms: u64,
    },
    /// The account prompt resolved.
    AccountsGranted {
        /// Accounts granted by the wallet; may be empty.
        accounts: Vec<String>,
    },
    /// The account prompt failed.
    ConnectErrored {
        /// Whether the provider reported an already-pending prompt.
        pending: bool,
    },
    /// The silent account listing resolved.
    AccountsListed {
        /// Already-authorized accounts; may be empty.
        accounts: Vec<String>,
    },
    /// The silent account listing failed.
    ListFailed,
    /// The signature request resolved.
    SignatureGranted {
        /// The account the signature was requested for.
        account: String,
        /// Signature returned by the wallet.
        signature: String,
    },
    /// The signature request failed or was declined.
    SignatureDenied,
    /// The provider pushed an account change.
    AccountsChanged {
        /// The new account set; empty means disconnected.
        accounts: Vec<String>,
    },
    /// The failure label's revert timer elapsed.
    RevertElapsed,
    /// The scheduled deep-link navigation timer elapsed.
    DeepLinkElapsed,
    /// The page became visible again.
    PageVisible {
        /// Whether the deep-link round-trip flag was set.
        pending_flag: bool,
        /// Current time in milliseconds, for the signature payload.
        now_ms: u64,
    },
}

/// Intents produced by a transition.
///
/// Provider and store intents are executed by the session driver; the
/// rest pass through to the host page. Timer intents carry the delay so
/// tests assert on the intent instead of elapsed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Apply a full UI snapshot.
    Render(UiState),
    /// Prompt for account access.
    RequestAccounts,
    /// List authorized accounts without prompting.
    ListAccounts,
    /// Ask the wallet to sign `message` with `account`.
    RequestSignature {
        /// Account to sign with.
        account: String,
        /// Payload to sign.
        message: String,
    },
    /// Stash the signature payload in the session store.
    StashAuthMessage {
        /// Payload to stash.
        message: String,
    },
    /// Set the deep-link round-trip flag.
    SetPendingFlag,
    /// Clear the deep-link round-trip flag.
    ClearPendingFlag,
    /// Revert the failure label after the fixed delay.
    ScheduleRevert {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Navigate to the wallet app after the fixed delay.
    ScheduleDeepLink {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Perform a full page navigation.
    Navigate {
        /// Absolute URL to navigate to.
        url: String,
    },
}

/// The connect/authenticate state machine.
#[derive(Debug, Clone)]
pub struct Sequencer {
    require_signature: bool,
    mobile: bool,
    site_name: String,
    page_host: String,
    page_path: String,
    revert_delay_ms: u64,
    deep_link_delay_ms: u64,
    phase: Phase,
    click_action: ClickAction,
    ui: UiState,
    auth_message: String,
}

impl Sequencer {
    /// Builds a machine in the initial idle state for `config`.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            require_signature: config.require_signature,
            mobile: is_mobile(&config.user_agent),
            site_name: config.site_name.clone(),
            page_host: config.page_host.clone(),
            page_path: config.page_path.clone(),
            revert_delay_ms: config.revert_delay_ms,
            deep_link_delay_ms: config.deep_link_delay_ms,
            phase: Phase::Idle,
            click_action: ClickAction::Connect,
            ui: UiState::initial(),
            auth_message: String::new(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase.clone()
    }

    /// Current click binding.
    #[must_use]
    pub const fn click_action(&self) -> ClickAction {
        self.click_action
    }

    /// The last rendered snapshot.
    #[must_use]
    pub const fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Disables the machine after a missing host dependency; every
    /// subsequent event is ignored.
    pub fn mark_unusable(&mut self) {
        self.phase = Phase::Unusable;
    }

    /// Applies one event and returns the resulting intents.
    #[must_use]
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        if matches!(self.phase, Phase::Unusable) {
            return Vec::new();
        }

        match event {
            Event::Started {
                pending_flag: true,
                now_ms,
                ..
            }
            | Event::PageVisible {
                pending_flag: true,
                now_ms,
            } => {
                // Returning from the wallet app: clear the flag first so
                // the sequence resumes exactly once.
                let mut effects = vec![Effect::ClearPendingFlag];
                effects.append(&mut self.begin_connect(now_ms));
                effects
            }
            Event::Started { availability, .. } => self.start_idle(availability),
            Event::PageVisible { .. } => Vec::new(),
            Event::ConnectClicked { now_ms } => match self.click_action {
                ClickAction::Connect => self.begin_connect(now_ms),
                ClickAction::OpenWalletApp => {
                    self.auth_message = auth_message(&self.site_name, now_ms);
                    self.open_wallet_effects()
                }
                ClickAction::SignOnly => self.begin_sign_retry(),
            },
            Event::AccountsGranted { accounts } => self.apply_granted(accounts),
            Event::AccountsListed { accounts } => self.apply_listed(accounts),
            Event::ListFailed => {
                self.ui = UiState::check_failed();
                vec![Effect::Render(self.ui.clone())]
            }
            Event::ConnectErrored { pending } => self.apply_connect_error(pending),
            Event::SignatureGranted { account, signature } => {
                // Applied even when a reset or later click happened while
                // the request was in flight: the stale snapshot winning is
                // the page's known race, left unguarded on purpose.
                self.ui = UiState::authenticated(&account);
                self.phase = Phase::Authenticated { account, signature };
                vec![Effect::Render(self.ui.clone())]
            }
            Event::SignatureDenied => self.apply_signature_denied(),
            Event::AccountsChanged { accounts } => self.apply_accounts_changed(accounts),
            Event::RevertElapsed => self.apply_revert(),
            Event::DeepLinkElapsed => self.open_wallet_effects(),
        }
    }

    /// Starts a fresh connect attempt, stamping a new signature payload.
    fn begin_connect(&mut self, now_ms: u64) -> Vec<Effect> {
        self.auth_message = auth_message(&self.site_name, now_ms);
        self.phase = Phase::Requesting;
        vec![Effect::RequestAccounts]
    }

    fn start_idle(&mut self, availability: WalletAvailability) -> Vec<Effect> {
        match availability {
            WalletAvailability::Installed => vec![Effect::ListAccounts],
            WalletAvailability::Ambiguous | WalletAvailability::NotInstalled => {
                if self.mobile {
                    self.click_action = ClickAction::OpenWalletApp;
                    self.ui = UiState::open_in_wallet();
                } else {
                    self.ui = UiState::not_installed();
                }
                vec![Effect::Render(self.ui.clone())]
            }
        }
    }

    fn apply_granted(&mut self, accounts: Vec<String>) -> Vec<Effect> {
        let Some(account) = accounts.into_iter().next() else {
            // Prompt resolved with nothing granted: stay put, no UI change.
            self.phase = Phase::Idle;
            return Vec::new();
        };

        self.ui = UiState::connected(&account, self.require_signature);
        let mut effects = vec![Effect::Render(self.ui.clone())];
        if self.require_signature {
            self.phase = Phase::SigningRequested {
                account: account.clone(),
                retry: false,
            };
            effects.push(Effect::RequestSignature {
                account,
                message: self.auth_message.clone(),
            });
        } else {
            self.phase = Phase::Connected { account };
        }
        effects
    }

    fn apply_listed(&mut self, accounts: Vec<String>) -> Vec<Effect> {
        if let Some(account) = accounts.into_iter().next() {
            // Already authorized: reflect the connection, never prompt.
            self.ui = UiState::connected(&account, self.require_signature);
            self.phase = Phase::Connected { account };
        } else {
            self.ui = UiState::idle_ready();
            self.phase = Phase::Idle;
        }
        vec![Effect::Render(self.ui.clone())]
    }

    fn apply_connect_error(&mut self, pending: bool) -> Vec<Effect> {
        if pending && self.mobile {
            // The wallet app already has a prompt open; reopening it is
            // the only automatic retry this flow performs.
            self.phase = Phase::Idle;
            self.ui = self.ui.clone().with_button_label("Open MetaMask app");
            return vec![
                Effect::Render(self.ui.clone()),
                Effect::ScheduleDeepLink {
                    delay_ms: self.deep_link_delay_ms,
                },
            ];
        }

        self.phase = Phase::ConnectFailed;
        self.ui = self.ui.clone().with_button_label("Connection failed");
        vec![
            Effect::Render(self.ui.clone()),
            Effect::ScheduleRevert {
                delay_ms: self.revert_delay_ms,
            },
        ]
    }

    fn apply_signature_denied(&mut self) -> Vec<Effect> {
        match self.phase.clone() {
            Phase::SigningRequested {
                account,
                retry: false,
            } => {
                self.ui = self.ui.clone().with_status("Connected (Not Authenticated)");
                if self.mobile {
                    // Rebind the button to a signature-only retry.
                    self.click_action = ClickAction::SignOnly;
                    self.ui = self.ui.clone().with_button_label("Sign to Authenticate");
                }
                self.phase = Phase::Connected { account };
                vec![Effect::Render(self.ui.clone())]
            }
            Phase::SigningRequested {
                account,
                retry: true,
            } => {
                self.ui = self.ui.clone().with_status("Authentication failed");
                self.phase = Phase::Connected { account };
                vec![Effect::Render(self.ui.clone())]
            }
            _ => Vec::new(),
        }
    }

    fn apply_accounts_changed(&mut self, accounts: Vec<String>) -> Vec<Effect> {
        if let Some(account) = accounts.into_iter().next() {
            // Pushed by the provider: reflect the connection without
            // re-triggering authentication.
            self.ui = UiState::connected(&account, self.require_signature);
            self.phase = Phase::Connected { account };
        } else {
            self.phase = Phase::Idle;
            self.click_action = ClickAction::Connect;
            self.ui = UiState::initial();
        }
        vec![Effect::Render(self.ui.clone())]
    }

    fn apply_revert(&mut self) -> Vec<Effect> {
        if !matches!(self.phase, Phase::ConnectFailed) {
            return Vec::new();
        }
        self.phase = Phase::Idle;
        let label = match self.click_action {
            ClickAction::OpenWalletApp => "Open in MetaMask",
            ClickAction::Connect | ClickAction::SignOnly => "Connect Wallet",
        };
        self.ui = self.ui.clone().with_button_label(label);
        vec![Effect::Render(self.ui.clone())]
    }

    fn begin_sign_retry(&mut self) -> Vec<Effect> {
        let Phase::Connected { account } = self.phase.clone() else {
            return Vec::new();
        };
        self.phase = Phase::SigningRequested {
            account: account.clone(),
            retry: true,
        };
        vec![Effect::RequestSignature {
            account,
            message: self.auth_message.clone(),
        }]
    }

    /// Stash the payload and the round-trip flag, then navigate away.
    /// The flag intent is emitted before the navigation intent so the
    /// flag is always persisted first.
    fn open_wallet_effects(&mut self) -> Vec<Effect> {
        self.ui = self.ui.clone().with_button_label("Opening MetaMask...");
        vec![
            Effect::StashAuthMessage {
                message: self.auth_message.clone(),
            },
            Effect::SetPendingFlag,
            Effect::Render(self.ui.clone()),
            Effect::Navigate {
                url: deep_link_url(&self.page_host, &self.page_path),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
    const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

    fn config(user_agent: &str, require_signature: bool) -> SessionConfig {
        SessionConfig {
            user_agent: user_agent.to_owned(),
            page_host: "dapp.example.com".to_owned(),
            page_path: "/play".to_owned(),
            site_name: "Y8".to_owned(),
            require_signature,
            connect_button_present: true,
            signer_library_present: true,
            revert_delay_ms: 3_000,
            deep_link_delay_ms: 1_000,
        }
    }

    fn machine(user_agent: &str, require_signature: bool) -> Sequencer {
        Sequencer::new(&config(user_agent, require_signature))
    }

    fn connect(seq: &mut Sequencer, account: &str) -> Vec<Effect> {
        let effects = seq.handle(Event::ConnectClicked { now_ms: 1 });
        assert_eq!(effects, vec![Effect::RequestAccounts]);
        seq.handle(Event::AccountsGranted {
            accounts: vec![account.to_owned()],
        })
    }

    #[test]
    fn click_starts_an_account_request() {
        let mut seq = machine(DESKTOP_UA, true);
        let effects = seq.handle(Event::ConnectClicked { now_ms: 7 });
        assert_eq!(effects, vec![Effect::RequestAccounts]);
        assert_eq!(seq.phase(), Phase::Requesting);
    }

    #[test]
    fn empty_grant_is_a_no_op() {
        let mut seq = machine(DESKTOP_UA, true);
        let _ = seq.handle(Event::ConnectClicked { now_ms: 7 });
        let effects = seq.handle(Event::AccountsGranted { accounts: vec![] });
        assert!(effects.is_empty());
        assert_eq!(seq.phase(), Phase::Idle);
    }

    #[test]
    fn grant_reflects_connection_then_requests_signature() {
        let mut seq = machine(DESKTOP_UA, true);
        let effects = connect(&mut seq, "0xABC");

        assert_eq!(
            effects[0],
            Effect::Render(UiState::connected("0xABC", true))
        );
        assert_eq!(
            effects[1],
            Effect::RequestSignature {
                account: "0xABC".to_owned(),
                message: auth_message("Y8", 1),
            }
        );
        assert_eq!(
            seq.phase(),
            Phase::SigningRequested {
                account: "0xABC".to_owned(),
                retry: false,
            }
        );
    }

    #[test]
    fn plain_variant_stops_at_connected() {
        let mut seq = machine(DESKTOP_UA, false);
        let effects = connect(&mut seq, "0xABC");

        assert_eq!(
            effects,
            vec![Effect::Render(UiState::connected("0xABC", false))]
        );
        assert_eq!(
            seq.phase(),
            Phase::Connected {
                account: "0xABC".to_owned(),
            }
        );
    }

    #[test]
    fn signature_grant_authenticates() {
        let mut seq = machine(DESKTOP_UA, true);
        let _ = connect(&mut seq, "0xABC");
        let effects = seq.handle(Event::SignatureGranted {
            account: "0xABC".to_owned(),
            signature: "0xSIG".to_owned(),
        });

        assert_eq!(effects, vec![Effect::Render(UiState::authenticated("0xABC"))]);
        assert_eq!(
            seq.phase(),
            Phase::Authenticated {
                account: "0xABC".to_owned(),
                signature: "0xSIG".to_owned(),
            }
        );
    }

    #[test]
    fn pending_error_on_mobile_schedules_the_deep_link() {
        let mut seq = machine(MOBILE_UA, true);
        let _ = seq.handle(Event::ConnectClicked { now_ms: 1 });
        let effects = seq.handle(Event::ConnectErrored { pending: true });

        assert_eq!(seq.ui().button_label, "Open MetaMask app");
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[1], Effect::ScheduleDeepLink { delay_ms: 1_000 });

        let effects = seq.handle(Event::DeepLinkElapsed);
        assert_eq!(
            effects[0],
            Effect::StashAuthMessage {
                message: auth_message("Y8", 1),
            }
        );
        assert_eq!(effects[1], Effect::SetPendingFlag);
        assert_eq!(
            effects[3],
            Effect::Navigate {
                url: "https://metamask.app.link/dapp/dapp.example.com/play?action=sign"
                    .to_owned(),
            }
        );
    }

    #[test_case(true; "pending error on desktop")]
    #[test_case(false; "generic error")]
    fn desktop_connect_failure_reverts_after_the_fixed_delay(pending: bool) {
        let mut seq = machine(DESKTOP_UA, true);
        let _ = seq.handle(Event::ConnectClicked { now_ms: 1 });
        let effects = seq.handle(Event::ConnectErrored { pending });

        assert_eq!(seq.ui().button_label, "Connection failed");
        assert_eq!(effects[1], Effect::ScheduleRevert { delay_ms: 3_000 });
        assert_eq!(seq.phase(), Phase::ConnectFailed);

        let effects = seq.handle(Event::RevertElapsed);
        assert_eq!(effects.len(), 1);
        assert_eq!(seq.ui().button_label, "Connect Wallet");
        assert_eq!(seq.phase(), Phase::Idle);
    }

    #[test]
    fn revert_out_of_phase_is_a_no_op() {
        let mut seq = machine(DESKTOP_UA, true);
        assert!(seq.handle(Event::RevertElapsed).is_empty());
    }

    #[test]
    fn signature_denied_keeps_the_connection() {
        let mut seq = machine(DESKTOP_UA, true);
        let _ = connect(&mut seq, "0xABC");
        let effects = seq.handle(Event::SignatureDenied);

        assert_eq!(effects.len(), 1);
        assert_eq!(seq.ui().status_text, "Connected (Not Authenticated)");
        assert_eq!(seq.ui().address_text, "0xABC");
        assert_eq!(seq.click_action(), ClickAction::Connect);
        assert_eq!(
            seq.phase(),
            Phase::Connected {
                account: "0xABC".to_owned(),
            }
        );
    }

    #[test]
    fn signature_denied_on_mobile_rebinds_the_click_to_a_retry() {
        let mut seq = machine(MOBILE_UA, true);
        let _ = connect(&mut seq, "0xABC");
        let _ = seq.handle(Event::SignatureDenied);

        assert_eq!(seq.click_action(), ClickAction::SignOnly);
        assert_eq!(seq.ui().button_label, "Sign to Authenticate");

        // The rebound click only retries the signature.
        let effects = seq.handle(Event::ConnectClicked { now_ms: 9 });
        assert_eq!(
            effects,
            vec![Effect::RequestSignature {
                account: "0xABC".to_owned(),
                message: auth_message("Y8", 1),
            }]
        );

        // A failed retry reports it on the status label.
        let _ = seq.handle(Event::SignatureDenied);
        assert_eq!(seq.ui().status_text, "Authentication failed");
    }

    #[test]
    fn accounts_changed_to_empty_resets_everything() {
        let mut seq = machine(MOBILE_UA, true);
        let _ = connect(&mut seq, "0xABC");
        let _ = seq.handle(Event::SignatureDenied);

        let effects = seq.handle(Event::AccountsChanged { accounts: vec![] });
        assert_eq!(effects, vec![Effect::Render(UiState::initial())]);
        assert_eq!(seq.phase(), Phase::Idle);
        // The disconnect also drops the sign-only rebinding.
        assert_eq!(seq.click_action(), ClickAction::Connect);
    }

    #[test]
    fn accounts_changed_reflects_without_reauthenticating() {
        let mut seq = machine(DESKTOP_UA, true);
        let effects = seq.handle(Event::AccountsChanged {
            accounts: vec!["0xDEF".to_owned()],
        });

        assert_eq!(effects, vec![Effect::Render(UiState::connected("0xDEF", true))]);
        assert_eq!(
            seq.phase(),
            Phase::Connected {
                account: "0xDEF".to_owned(),
            }
        );
    }

    #[test]
    fn startup_with_the_pending_flag_clears_it_then_connects() {
        let mut seq = machine(MOBILE_UA, true);
        let effects = seq.handle(Event::Started {
            pending_flag: true,
            availability: WalletAvailability::Installed,
            now_ms: 5,
        });
        assert_eq!(effects, vec![Effect::ClearPendingFlag, Effect::RequestAccounts]);
        assert_eq!(seq.phase(), Phase::Requesting);
    }

    #[test]
    fn startup_with_wallet_installed_lists_silently() {
        let mut seq = machine(DESKTOP_UA, true);
        let effects = seq.handle(Event::Started {
            pending_flag: false,
            availability: WalletAvailability::Installed,
            now_ms: 5,
        });
        assert_eq!(effects, vec![Effect::ListAccounts]);

        let effects = seq.handle(Event::AccountsListed {
            accounts: vec!["0xABC".to_owned()],
        });
        assert_eq!(effects, vec![Effect::Render(UiState::connected("0xABC", true))]);
    }

    #[test]
    fn startup_with_no_authorized_accounts_enables_the_button() {
        let mut seq = machine(DESKTOP_UA, true);
        let _ = seq.handle(Event::Started {
            pending_flag: false,
            availability: WalletAvailability::Installed,
            now_ms: 5,
        });
        let effects = seq.handle(Event::AccountsListed { accounts: vec![] });
        assert_eq!(effects, vec![Effect::Render(UiState::idle_ready())]);
    }

    #[test]
    fn startup_list_failure_reports_on_the_button() {
        let mut seq = machine(DESKTOP_UA, true);
        let _ = seq.handle(Event::Started {
            pending_flag: false,
            availability: WalletAvailability::Installed,
            now_ms: 5,
        });
        let effects = seq.handle(Event::ListFailed);
        assert_eq!(effects, vec![Effect::Render(UiState::check_failed())]);
    }

    #[test_case(WalletAvailability::NotInstalled; "no reference")]
    #[test_case(WalletAvailability::Ambiguous; "unflagged reference")]
    fn startup_without_the_wallet_on_desktop_disables_the_button(
        availability: WalletAvailability,
    ) {
        let mut seq = machine(DESKTOP_UA, true);
        let effects = seq.handle(Event::Started {
            pending_flag: false,
            availability,
            now_ms: 5,
        });
        assert_eq!(effects, vec![Effect::Render(UiState::not_installed())]);
        assert_eq!(seq.click_action(), ClickAction::Connect);
    }

    #[test]
    fn startup_without_the_wallet_on_mobile_binds_the_deep_link() {
        let mut seq = machine(MOBILE_UA, true);
        let effects = seq.handle(Event::Started {
            pending_flag: false,
            availability: WalletAvailability::NotInstalled,
            now_ms: 5,
        });
        assert_eq!(effects, vec![Effect::Render(UiState::open_in_wallet())]);
        assert_eq!(seq.click_action(), ClickAction::OpenWalletApp);

        let effects = seq.handle(Event::ConnectClicked { now_ms: 6 });
        assert_eq!(
            effects[0],
            Effect::StashAuthMessage {
                message: auth_message("Y8", 6),
            }
        );
        assert!(matches!(effects[3], Effect::Navigate { .. }));
    }

    #[test]
    fn page_visible_without_the_flag_does_nothing() {
        let mut seq = machine(MOBILE_UA, true);
        assert!(seq
            .handle(Event::PageVisible {
                pending_flag: false,
                now_ms: 5,
            })
            .is_empty());
    }

    #[test]
    fn stale_signature_result_still_lands() {
        let mut seq = machine(DESKTOP_UA, true);
        let _ = connect(&mut seq, "0xABC");
        // A disconnect races the in-flight signature request.
        let _ = seq.handle(Event::AccountsChanged { accounts: vec![] });
        let effects = seq.handle(Event::SignatureGranted {
            account: "0xABC".to_owned(),
            signature: "0xSIG".to_owned(),
        });

        // The stale result overwrites the reset; this mirrors the page's
        // unguarded in-flight requests.
        assert_eq!(effects, vec![Effect::Render(UiState::authenticated("0xABC"))]);
    }

    #[test]
    fn unusable_machine_ignores_all_events() {
        let mut seq = machine(DESKTOP_UA, true);
        seq.mark_unusable();
        assert!(seq.handle(Event::ConnectClicked { now_ms: 1 }).is_empty());
        assert!(seq
            .handle(Event::AccountsChanged {
                accounts: vec!["0xABC".to_owned()],
            })
            .is_empty());
    }
}
