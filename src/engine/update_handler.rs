use std::{
    collections::HashMap,
    sync::{mpsc::Sender, Arc, Mutex},
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::sampler::Sampler;

/// Custom chain inspector for `Engine::run`.
///
/// This trait can be used to implement progress capture and early stopping.
/// Every chain gets its own clone of the handler, so state shared between
/// chains must live behind an `Arc`.
pub trait UpdateHandler: Clone + Send + Sync {
    /// Initialize the handler, for all chains (globally).
    ///
    /// This method is called before any chain has been stepped.
    fn global_init(&mut self, _n_iters: usize, _chains: &[Sampler]) {}

    /// Initialize for a chain before its first step
    fn new_chain_init(&mut self, _chain_id: usize, _chain: &Sampler) {}

    /// Handler for each chain step.
    fn chain_updated(&mut self, _chain_id: usize, _chain: &Sampler) {}

    /// Called after a chain has completed all of its steps
    fn chain_complete(&mut self, _chain_id: usize, _chain: &Sampler) {}

    /// Should the `Engine` stop running.
    ///
    /// The method is called before each chain step.
    fn stop_engine(&self) -> bool {
        false
    }

    /// Should the chain stop running.
    fn stop_chain(&self, _chain_id: usize) -> bool {
        false
    }

    /// Cleanup upon the end of the run
    fn finalize(&mut self) {}
}

macro_rules! impl_tuple {
($($idx:tt $t:tt),+) => {
    impl<$($t,)+> UpdateHandler for ($($t,)+)
    where
        $($t: UpdateHandler,)+
    {
        fn global_init(&mut self, n_iters: usize, chains: &[Sampler]) {
            $(
                self.$idx.global_init(n_iters, chains);
            )+
        }

        fn new_chain_init(&mut self, chain_id: usize, chain: &Sampler) {
            $(
                self.$idx.new_chain_init(chain_id, chain);
            )+
        }

        fn chain_updated(&mut self, chain_id: usize, chain: &Sampler) {
            $(
                self.$idx.chain_updated(chain_id, chain);
            )+
        }

        fn chain_complete(&mut self, chain_id: usize, chain: &Sampler) {
            $(
                self.$idx.chain_complete(chain_id, chain);
            )+
        }

        fn stop_engine(&self) -> bool {
            $(
                self.$idx.stop_engine()
            )||+
        }

        fn stop_chain(&self, chain_id: usize) -> bool {
            $(
                self.$idx.stop_chain(chain_id)
            )||+
        }

        fn finalize(&mut self) {
            $(
                self.$idx.finalize();
            )+
        }
    }
};
}

impl_tuple!(0 A, 1 B, 2 C);
impl_tuple!(0 A, 1 B);

impl UpdateHandler for () {}

/// Stop every chain after a wall-clock limit
#[derive(Clone, Debug)]
pub struct Timeout {
    timeout: Duration,
    start: Instant,
}

impl Timeout {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            start: Instant::now(),
        }
    }
}

impl UpdateHandler for Timeout {
    fn global_init(&mut self, _n_iters: usize, _chains: &[Sampler]) {
        self.start = Instant::now();
    }

    fn stop_engine(&self) -> bool {
        self.start.elapsed() >= self.timeout
    }
}

/// Add a progress bar to the output
#[derive(Clone, Default)]
pub enum ProgressBar {
    #[default]
    UnInitialized,
    Initialized {
        sender: Arc<Mutex<Sender<(usize, f64)>>>,
        handle: Arc<Mutex<Option<JoinHandle<()>>>>,
    },
}

impl ProgressBar {
    pub fn new() -> Self {
        Self::UnInitialized
    }
}

impl UpdateHandler for ProgressBar {
    fn global_init(&mut self, n_iters: usize, chains: &[Sampler]) {
        const UPDATE_INTERVAL: Duration = Duration::from_millis(250);

        let (sender, receiver) = std::sync::mpsc::channel();
        let total_iters = chains.len() * n_iters;

        let handle = std::thread::spawn(move || {
            use indicatif::ProgressStyle;

            let progress_bar = indicatif::ProgressBar::new(total_iters as u64);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "ln f {msg} {wide_bar:.white/white} │{pos}/{len}, Elapsed {elapsed_precise} ETA {eta_precise}│",
            ) {
                progress_bar.set_style(style.progress_chars("━╾ "));
            }

            let mut last_update = Instant::now();
            let mut completed_iters: usize = 0;
            let mut chain_ln_targets = HashMap::new();

            while let Ok((chain_id, ln_target)) = receiver.recv() {
                completed_iters += 1;
                chain_ln_targets.insert(chain_id, ln_target);

                if last_update.elapsed() > UPDATE_INTERVAL {
                    last_update = Instant::now();
                    progress_bar.set_position(completed_iters as u64);
                    let mean_ln_target = chain_ln_targets.values().sum::<f64>()
                        / (chain_ln_targets.len() as f64);
                    progress_bar.set_message(format!("{:.2}", mean_ln_target));
                }
            }

            progress_bar.finish_and_clear();
        });

        *self = Self::Initialized {
            sender: Arc::new(Mutex::new(sender)),
            handle: Arc::new(Mutex::new(Some(handle))),
        }
    }

    fn chain_updated(&mut self, chain_id: usize, chain: &Sampler) {
        if let Self::Initialized { sender, .. } = self {
            if let Ok(sender) = sender.lock() {
                // the receiver only hangs up after finalize
                let _ = sender.send((chain_id, chain.ln_target()));
            }
        }
    }

    fn finalize(&mut self) {
        if let Self::Initialized { sender, handle } = std::mem::take(self) {
            std::mem::drop(sender);

            let handle = handle.lock().ok().and_then(|mut handle| handle.take());
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    log::warn!("progress bar thread panicked");
                }
            }
        }
    }
}
