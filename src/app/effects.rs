use tracing::debug;

use crate::app::{App, Command, Message, Model, update};

impl App {
    /// Apply `msg`, then start whatever requests it queued and fold in any
    /// completions that are already available.
    pub fn dispatch(&self, model: Model, msg: Message) -> Model {
        let mut model = update(model, msg);
        self.run_commands(&mut model);
        self.apply_completions(&mut model);
        model
    }

    /// Feed finished requests back through `update`.
    ///
    /// Returns `true` if anything was applied.
    pub(super) fn apply_completions(&self, model: &mut Model) -> bool {
        let mut applied = false;
        loop {
            let ready = self.worker.drain();
            if ready.is_empty() {
                return applied;
            }
            for completion in ready {
                debug!(seq = completion.seq, "applying completion");
                *model = update(std::mem::take(model), Message::from(completion));
                self.run_commands(model);
            }
            applied = true;
        }
    }

    fn run_commands(&self, model: &mut Model) {
        for command in model.take_commands() {
            match command {
                Command::Load { seq } => self.worker.load(seq),
                Command::Submit { seq, submission } => self.worker.submit(seq, submission),
            }
        }
    }
}
