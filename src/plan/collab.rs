//! Contracts for the collaborators that produce a render's inputs.
//!
//! Story acquisition, title-card capture, speech synthesis and background search all live
//! outside this crate. Each resolves either to a value or to a tagged [`Input::Unavailable`];
//! [`assemble_plan`] decides per input whether absence is fatal.

use std::path::PathBuf;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::plan::model::{OverlayWindow, RenderPlan, Segment, TimedWord};
use crate::plan::script::{DEFAULT_BODY_LIMIT, clean_text, truncate_body};

/// A collaborator's answer: a resolved value, or a reason it could not be produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Input<T> {
    /// The input was produced.
    Ready(T),
    /// The input could not be produced.
    Unavailable(String),
}

impl<T> Input<T> {
    /// Tag an unavailable input.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// The value, if ready.
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Unavailable(_) => None,
        }
    }

    /// `true` for [`Input::Ready`].
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Input<T> {
    fn from(r: Result<T, E>) -> Self {
        match r {
            Ok(v) => Self::Ready(v),
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }
}

/// A post to narrate.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Story {
    /// Stable identifier, used to name intermediate files.
    pub id: String,
    /// Post title, narrated first.
    pub title: String,
    /// Post body.
    pub body: String,
    /// Source address of the post.
    pub url: String,
}

/// Synthesised speech for one piece of text.
#[derive(Clone, Debug, PartialEq)]
pub struct Narration {
    /// Written audio file.
    pub audio_path: PathBuf,
    /// Word timings relative to the start of the audio.
    pub words: Vec<TimedWord>,
    /// The synthesiser's own reported audio length, in seconds.
    pub duration: f64,
}

impl From<Narration> for Segment {
    fn from(n: Narration) -> Self {
        Segment::new(n.audio_path, n.words, n.duration)
    }
}

/// Supplies stories to narrate.
pub trait StorySource {
    /// Next story, or why none is available.
    fn next_story(&mut self) -> Input<Story>;
}

/// Captures an image of a story's title.
pub trait TitleCardCapture {
    /// Path to a title-card image for `story`.
    fn capture(&mut self, story: &Story) -> Input<PathBuf>;
}

/// Turns text into narration audio plus word timings.
pub trait NarrationSynth {
    /// Synthesise `text`; `stem` names the output files (e.g. `"title"`, `"content"`).
    fn synthesize(&mut self, text: &str, stem: &str) -> ReelResult<Narration>;
}

/// Finds a background video for a story.
pub trait BackgroundSource {
    /// Path to a background video, or why none was found.
    fn background_for(&mut self, story: &Story) -> Input<PathBuf>;
}

/// Everything needed to build a two-part (title, body) render plan.
#[derive(Clone, Debug)]
pub struct StoryInputs {
    /// Narrated title.
    pub title: Narration,
    /// Narrated body, if the body had any speakable text.
    pub body: Option<Narration>,
    /// Title card shown while the title is read.
    pub title_card: Input<PathBuf>,
    /// Background video.
    pub background: Input<PathBuf>,
}

/// Build a plan: the title segment, then the body segment.
///
/// The title card is shown for exactly the title segment's duration; when it is unavailable the
/// plan has no overlay. An unavailable background is an input-resolution error.
pub fn assemble_plan(
    inputs: StoryInputs,
    canvas: Canvas,
    output_path: impl Into<PathBuf>,
) -> ReelResult<RenderPlan> {
    let background_path = match inputs.background {
        Input::Ready(p) => p,
        Input::Unavailable(reason) => {
            return Err(ReelError::input(
                "<background>",
                format!("no background video: {reason}"),
            ));
        }
    };

    let title_duration = inputs.title.duration;
    let overlays = match inputs.title_card {
        Input::Ready(card) => vec![OverlayWindow::centered(card, 0.0, title_duration)],
        Input::Unavailable(reason) => {
            tracing::warn!(%reason, "title card unavailable, rendering without it");
            Vec::new()
        }
    };

    let mut segments = vec![Segment::from(inputs.title)];
    segments.extend(inputs.body.map(Segment::from));

    let plan = RenderPlan {
        background_path,
        canvas,
        segments,
        overlays,
        output_path: output_path.into(),
    };
    plan.validate()?;
    Ok(plan)
}

/// Run the collaborators for one story and assemble its plan.
///
/// Text is cleaned before synthesis and the body is cut to `body_limit` characters
/// ([`DEFAULT_BODY_LIMIT`] by default). A body with nothing speakable yields a title-only plan.
#[tracing::instrument(skip_all, fields(story = %story.id))]
pub fn plan_story(
    story: &Story,
    synth: &mut dyn NarrationSynth,
    capture: &mut dyn TitleCardCapture,
    backgrounds: &mut dyn BackgroundSource,
    canvas: Canvas,
    output_path: impl Into<PathBuf>,
    body_limit: Option<usize>,
) -> ReelResult<RenderPlan> {
    let title_card = capture.capture(story);

    let title_text = clean_text(&story.title);
    if title_text.is_empty() {
        return Err(ReelError::validation(format!(
            "story '{}' has no speakable title",
            story.id
        )));
    }
    let title = synth.synthesize(&title_text, "title")?;

    let body_text = clean_text(&story.body);
    let body = if body_text.is_empty() {
        tracing::warn!("story body has no speakable text");
        None
    } else {
        let body_text = truncate_body(&body_text, body_limit.unwrap_or(DEFAULT_BODY_LIMIT));
        Some(synth.synthesize(&body_text, "content")?)
    };

    let background = backgrounds.background_for(story);
    assemble_plan(
        StoryInputs {
            title,
            body,
            title_card,
            background,
        },
        canvas,
        output_path,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/plan/collab.rs"]
mod tests;
