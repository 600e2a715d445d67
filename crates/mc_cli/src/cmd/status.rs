use std::sync::Arc;

use comfy_table::Row;
use mc_session::RecordingView;

use super::{Output, Success};
use crate::Ctx;

#[derive(Debug, clap::Args)]
pub(crate) struct Status {}

impl Status {
    pub(crate) async fn run(self, ctx: &Ctx) -> Output {
        let session = ctx.session(Arc::new(RecordingView::new()), false);
        let authenticated = session.start().await;
        let state = session.auth_state();
        let connectivity = session.refresh_status().await;

        let mut rows = vec![
            Row::from(vec!["Server".to_owned(), ctx.config().server.base_url.clone()]),
            Row::from(vec![
                "Logged in".to_owned(),
                if authenticated { "yes" } else { "no" }.to_owned(),
            ]),
        ];

        if let Some(user) = &state.user {
            let name = user.display_name().unwrap_or("unknown");
            rows.push(Row::from(vec!["User".to_owned(), name.to_owned()]));
        }

        rows.push(Row::from(vec![
            "Tool server".to_owned(),
            connectivity.to_string(),
        ]));

        Ok(Success::Details {
            title: Some("Session status".to_owned()),
            rows,
        })
    }
}
