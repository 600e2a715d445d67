use std::sync::Arc;

use mc_session::RecordingView;

use super::{Output, Success};
use crate::{Ctx, error::Error, table};

#[derive(Debug, clap::Args)]
pub(crate) struct Capabilities {}

impl Capabilities {
    pub(crate) async fn run(self, ctx: &Ctx) -> Output {
        let session = ctx.session(Arc::new(RecordingView::new()), false);
        if !session.start().await {
            return Err(Error::NotAuthenticated.into());
        }

        let capabilities = session.load_capabilities().await?;
        if capabilities.is_empty() {
            return Ok("The backend offers no capabilities.".to_owned().into());
        }

        let (header, rows) = table::capabilities(&capabilities, &ctx.config().capabilities);
        Ok(Success::Table { header, rows })
    }
}
