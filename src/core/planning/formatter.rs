// Pure transformation of a content plan into an ordered batch of document
// edit operations.
//
// The target document model addresses text by character offset, and every
// operation in a batch is interpreted after all earlier operations have been
// applied. That forces a single forward pass: we keep a running cursor and
// only ever insert at it, so later positions account for everything inserted
// before them. Offsets are counted in UTF-16 code units because that is the
// unit the document API indexes by, not bytes.

use thiserror::Error;

use super::plan_models::ContentPlan;

/// The first insertable position in a fresh document (index 0 is the
/// immutable section break).
const FIRST_INDEX: u32 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("content plan is missing the required 'topic' field")]
    MissingTopic,
}

/// Named paragraph styles supported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Title,
    Heading1,
    Heading2,
    NormalText,
}

/// One edit against the document. Order matters: each operation's addressing
/// assumes all prior operations in the batch have already been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    InsertText { at: u32, text: String },
    SetParagraphStyle { start: u32, end: u32, style: ParagraphStyle },
    SetTextStyle { start: u32, end: u32, bold: bool },
}

/// Render a plan into the ordered operation batch.
///
/// Absent or empty fields contribute no operations and do not advance the
/// cursor; the output degrades gracefully down to a single topic line. Only
/// a missing `topic` is an error, since that is the sole required field.
pub fn format_plan(plan: &ContentPlan) -> Result<Vec<EditOperation>, PlanError> {
    let topic = plan.topic().ok_or(PlanError::MissingTopic)?;

    let mut doc = OperationBuilder::new();

    if let Some(title) = plan.title() {
        doc.styled_line(title, ParagraphStyle::Title);
    }

    // Metadata block: topic is always present, the rest only when set.
    doc.start_section();
    doc.labeled_line("Topic", topic);
    if let Some(duration) = plan.duration {
        doc.labeled_line("Duration", &format!("{duration} seconds"));
    }
    if let Some(key_message) = plan.key_message() {
        doc.labeled_line("Key Message", key_message);
    }

    if !plan.scenes.is_empty() {
        doc.start_section();
        doc.styled_line("Scene Breakdown", ParagraphStyle::Heading1);

        for (index, scene) in plan.scenes.iter().enumerate() {
            doc.start_section();

            // Explicit scene numbers win; otherwise fall back to the scene's
            // 1-based position in input order.
            let number = scene.scene_number.unwrap_or(index as u32 + 1);
            let header = match scene.duration {
                Some(seconds) => format!("Scene {number}: {seconds} seconds"),
                None => format!("Scene {number}"),
            };
            doc.styled_line(&header, ParagraphStyle::Heading2);

            if let Some(subtitle) = scene.subtitle() {
                doc.labeled_line("Subtitle", subtitle);
            }
            if let Some(narration) = scene.narration() {
                doc.labeled_line("Narration", narration);
            }
            if let Some(visual) = scene.visual_description() {
                doc.labeled_line("Visual Reference", visual);
            }
        }
    }

    if let Some(conclusion) = plan.conclusion() {
        doc.start_section();
        doc.labeled_line("Conclusion", conclusion);
    }

    Ok(doc.finish())
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// Accumulator carrying the running cursor. All insertion happens through
/// this so positions can never get out of order or overlap.
struct OperationBuilder {
    ops: Vec<EditOperation>,
    cursor: u32,
    pending_gap: bool,
}

impl OperationBuilder {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            cursor: FIRST_INDEX,
            pending_gap: false,
        }
    }

    /// Request a blank separator line before the next inserted line. No-op
    /// when nothing has been emitted yet, so empty sections never leave
    /// stray gaps behind.
    fn start_section(&mut self) {
        if !self.ops.is_empty() {
            self.pending_gap = true;
        }
    }

    /// Insert one line of text (plus trailing line break) at the cursor and
    /// return the range covering the line itself, gap excluded.
    fn insert_line(&mut self, line: &str) -> (u32, u32) {
        let mut text = String::new();
        if self.pending_gap {
            text.push('\n');
            self.pending_gap = false;
        }
        let start = self.cursor + utf16_len(&text);
        text.push_str(line);
        text.push('\n');

        let at = self.cursor;
        let end = at + utf16_len(&text);
        self.ops.push(EditOperation::InsertText { at, text });
        self.cursor = end;
        (start, end)
    }

    /// A heading-styled line (title or scene header).
    fn styled_line(&mut self, line: &str, style: ParagraphStyle) {
        let (start, end) = self.insert_line(line);
        self.ops
            .push(EditOperation::SetParagraphStyle { start, end, style });
    }

    /// A body line of the form "Label: value" with the label in bold.
    /// Body lines are pinned to normal text so they don't inherit the
    /// paragraph style of a heading inserted just before them.
    fn labeled_line(&mut self, label: &str, value: &str) {
        let line = format!("{label}: {value}");
        let (start, end) = self.insert_line(&line);
        self.ops.push(EditOperation::SetParagraphStyle {
            start,
            end,
            style: ParagraphStyle::NormalText,
        });
        self.ops.push(EditOperation::SetTextStyle {
            start,
            // Label plus the colon.
            end: start + utf16_len(label) + 1,
            bold: true,
        });
    }

    fn finish(self) -> Vec<EditOperation> {
        self.ops
    }
}
