// BSD 3-Clause License
// Copyright (c) 2026, Virtual Cable S.L.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
//    this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
//    may be used to endorse or promote products derived from this software
//    without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

// Authors: Adolfo Gómez, dkmaster at dkmon dot com

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal as unix_signal};
use tokio::signal;

use shared::{
    consts::{TICKET_SWEEP_INTERVAL_SECS, TICKET_TTL_SECS},
    log,
    system::trigger::Trigger,
    ticket::{self, TicketStore},
};

pub mod config;
pub mod consts;
pub mod game;
pub mod identity;
pub mod login;
pub mod sessions;

use config::{Args, RelayConfig};

// Exit codes: 0 clean shutdown, 1 runtime error, 2 configuration error
// (clap uses 2 for flag parse failures on its own)
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = match RelayConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e:#}");
            return ExitCode::from(2);
        }
    };
    let level = if config.debug {
        "debug"
    } else {
        consts::DEFAULT_LOG_LEVEL
    };
    log::setup_logging(level, log::LogType::Relay);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(config: RelayConfig) -> anyhow::Result<()> {
    let stop = Trigger::new();
    spawn_signal_handler(stop.clone());

    let store = Arc::new(TicketStore::new());
    let identities = Arc::new(identity::IdentityMap::new());

    let login_proxy = Arc::new(login::LoginProxy::new(
        &config,
        store.clone(),
        identities.clone(),
    ));
    let game_proxy = Arc::new(game::GameProxy::new(&config, store.clone()));

    // A failing host reports here; the first error wins and ends the process
    let (err_tx, err_rx) = flume::bounded::<anyhow::Error>(1);

    let mut tasks = Vec::new();
    tasks.push(tokio::spawn({
        let stop = stop.clone();
        let err_tx = err_tx.clone();
        async move {
            if let Err(e) = login_proxy.listen_and_serve(stop).await {
                let _ = err_tx.try_send(e.context("login proxy failed"));
            }
        }
    }));
    tasks.push(tokio::spawn({
        let stop = stop.clone();
        let err_tx = err_tx.clone();
        async move {
            if let Err(e) = game_proxy.listen_and_serve(stop).await {
                let _ = err_tx.try_send(e.context("game proxy failed"));
            }
        }
    }));
    tasks.push(tokio::spawn(ticket::sweep_loop(
        store,
        Duration::from_secs(TICKET_TTL_SECS),
        Duration::from_secs(TICKET_SWEEP_INTERVAL_SECS),
        stop.clone(),
    )));

    let result = tokio::select! {
        _ = stop.wait_async() => Ok(()),
        err = err_rx.recv_async() => match err {
            Ok(e) => Err(e),
            Err(_) => Ok(()),
        },
    };

    // Cooperative shutdown: every host drains its sessions before returning
    stop.trigger();
    for task in tasks {
        let _ = task.await;
    }
    result
}

fn spawn_signal_handler(stop: Trigger) {
    tokio::spawn(async move {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut terminate = match unix_signal(SignalKind::terminate()) {
                Ok(terminate) => terminate,
                Err(e) => {
                    log::error!("failed to install SIGTERM handler: {:?}", e);
                    return;
                }
            };
            let mut hangup = match unix_signal(SignalKind::hangup()) {
                Ok(hangup) => hangup,
                Err(e) => {
                    log::error!("failed to install SIGHUP handler: {:?}", e);
                    return;
                }
            };
            tokio::select! {
                _ = ctrl_c => log::info!("received interrupt, shutting down"),
                _ = terminate.recv() => log::info!("received SIGTERM, shutting down"),
                _ = hangup.recv() => log::info!("received SIGHUP, shutting down"),
            }
        }

        #[cfg(not(unix))]
        if ctrl_c.await.is_ok() {
            log::info!("received interrupt, shutting down");
        }

        stop.trigger();
    });
}
