// UI layer: one session loop driven through the `Frontend` trait. Two
// implementations exist: `tui::TuiFrontend`, a full-screen crossterm list,
// and `line::LineFrontend`, a numbered listing read line by line for
// terminals that cannot host the full-screen one.

pub mod keymap;
pub mod line;
pub mod navigator;
pub mod tui;

use crate::api::Transport;
use crate::article::Article;
use crate::store::{ArticleStore, ItemState};
use crate::worker::offload;
use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;

/// Time between two frames of the loading indicator.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(500);

/// What the session loop needs from an interface.
pub trait Frontend {
    /// Show a freshly fetched list, selection back at the top.
    fn present(&mut self, items: &[Article]) -> Result<()>;

    /// Let the user pick one of the `count` presented items. `None` quits.
    fn prompt_selection(&mut self, count: usize) -> Result<Option<usize>>;

    /// Ask for a non-empty replacement for `old`. `None` means the user
    /// backed out and wants the list again.
    fn prompt_new_name(&mut self, old: &str) -> Result<Option<String>>;

    /// Draw frame `frame` of a loading indicator labelled `message`.
    fn draw_progress(&mut self, message: &str, frame: usize) -> Result<()>;

    /// Remove the loading indicator completely.
    fn clear_progress(&mut self) -> Result<()>;
}

/// Await `work` while animating a loading indicator.
///
/// The ticker is dropped the moment `work` resolves, so no frame is drawn
/// after that point, and the indicator is cleared before returning whatever
/// `work` produced.
///
/// `work` always runs to completion. A frame that fails to draw stops the
/// animation but not the wait; only a failure to clear the indicator is
/// returned as an error.
pub async fn with_indicator<F, W, T>(frontend: &mut F, message: &str, work: W) -> Result<T>
where
    F: Frontend + ?Sized,
    W: Future<Output = T>,
{
    tokio::pin!(work);
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    let mut frame = 0;
    let mut animating = true;
    let output = loop {
        tokio::select! {
            biased;
            output = &mut work => break output,
            _ = ticker.tick(), if animating => {
                if let Err(e) = frontend.draw_progress(message, frame) {
                    log::warn!("stopped the {message:?} indicator: {e:#}");
                    animating = false;
                }
                frame += 1;
            }
        }
    };
    frontend
        .clear_progress()
        .with_context(|| format!("Clearing the {message:?} indicator"))?;
    Ok(output)
}

/// Load the unread list, let the user rename items until they quit.
pub async fn run_session<F, T>(frontend: &mut F, store: &ArticleStore<T>) -> Result<()>
where
    F: Frontend + ?Sized,
    T: Transport + Clone + 'static,
{
    let lister = store.clone();
    let mut articles = with_indicator(frontend, "Loading articles", offload(move || lister.list(ItemState::Unread)))
        .await?
        .context("Loading articles")?;

    frontend.present(&articles)?;
    loop {
        let Some(index) = frontend.prompt_selection(articles.len())? else {
            return Ok(());
        };
        let Some(article) = articles.get(index).cloned() else {
            log::warn!("selection {index} is outside a list of {}", articles.len());
            continue;
        };
        // Backing out keeps the presented list and its selection.
        let Some(new_name) = frontend.prompt_new_name(&article.to_string())? else {
            continue;
        };

        // Rename and reload on the same worker; one indicator covers both.
        let renamer = store.clone();
        articles = with_indicator(
            frontend,
            "Renaming article",
            offload(move || {
                let renamed = renamer.rename(&article, &new_name, true)?;
                log::info!("renamed {} to {} ({})", article.item_id, renamed.item_id, new_name);
                renamer.list(ItemState::Unread)
            }),
        )
        .await?
        .context("Renaming article")?;
        frontend.present(&articles)?;
    }
}
