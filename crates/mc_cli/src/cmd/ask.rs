use std::sync::Arc;

use mc_config::capabilities::CapabilitiesConfig;
use mc_md::ansi::Renderer;
use mc_session::{ChatSession, RecordingView, SubmitOutcome};

use super::{Output, Success};
use crate::{Ctx, error::Error, view::tools_used};

#[derive(Debug, clap::Args)]
pub(crate) struct Ask {
    /// The message to send.
    #[arg(required_unless_present = "capability", num_args = 1..)]
    message: Vec<String>,

    /// Use the example of the n-th capability (counting from 1) as the
    /// message.
    #[arg(long = "use", value_name = "N", conflicts_with = "message")]
    capability: Option<usize>,
}

impl Ask {
    pub(crate) async fn run(self, ctx: &Ctx) -> Output {
        let session = ctx.session(Arc::new(RecordingView::new()), false);
        if !session.start().await {
            return Err(Error::NotAuthenticated.into());
        }

        let message = match self.capability {
            Some(n) => example(&session, n)?,
            None => self.message.join(" "),
        };

        ask(
            &session,
            &message,
            &ctx.renderer(),
            &ctx.config().capabilities,
        )
        .await
    }
}

/// The example message of capability `n`, counting from 1.
fn example(session: &ChatSession, n: usize) -> Result<String, super::Error> {
    let capability = n
        .checked_sub(1)
        .and_then(|index| session.select_capability(index))
        .ok_or_else(|| format!("No capability #{n}. Run `mcpchat capabilities` to list them."))?;

    Ok(capability.example)
}

async fn ask(
    session: &ChatSession,
    message: &str,
    renderer: &Renderer,
    icons: &CapabilitiesConfig,
) -> Output {
    match session.submit(message).await {
        SubmitOutcome::Answered(turn) => {
            let mut reply = renderer.render(&turn.text);
            if !turn.tool_calls.is_empty() {
                reply.push('\n');
                reply.push_str(&renderer.dim(&tools_used(&turn, icons)));
            }

            Ok(Success::Message(reply))
        }
        SubmitOutcome::Failed(error) => Err(error.into()),
        SubmitOutcome::Ignored => Err("Nothing to send.".into()),
        SubmitOutcome::Discarded => Err("The reply was discarded.".into()),
    }
}
