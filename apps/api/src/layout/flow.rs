//! Page/Section Flow Controller: walks the CV sections in a fixed order,
//! drawing each one onto a `Canvas` and deciding where pages break.
//!
//! # State machine
//! HEADER → SUMMARY → SKILLS → EXPERIENCE → PROJECTS → EDUCATION →
//! VOLUNTEERING → REFERENCES → DONE
//!
//! Checks run *ahead* of content: before a section, before every skill group,
//! job, bullet, project and education entry, and (with the `line_floor`
//! threshold) before every drawn line. `check_page_break` returns a tagged
//! result telling the caller whether drawing may continue on the current page,
//! continue on a fresh page, or whether the page limit was hit and the
//! document is finished. Content past the page limit is dropped and the render
//! is reported as truncated.
//!
//! A page break only moves the cursor; the canvas page is opened by the first
//! draw that lands on it, so a document never ends with a blank page.
//!
//! References never trigger a page break: they render only if enough space
//! is left on the current page.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::correction::TextCorrector;
use crate::layout::canvas::Canvas;
use crate::layout::font_metrics::{Font, PageGeometry};
use crate::layout::normalize::{
    normalize, prepare_list_item, single_line, truncate_with_ellipsis, SHORT_ITEM_MAX_CHARS,
};
use crate::layout::paragraph::{
    ellipsize_to_width, justify_paragraphs, wrap_lines, TextStyle, PARAGRAPH_GAP,
};
use crate::layout::LayoutError;
use crate::models::cv::CvRecord;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Maximum number of pages in a rendered CV.
pub const DEFAULT_PAGE_LIMIT: u32 = 2;
/// Volunteering entries kept; the rest are dropped.
pub const MAX_VOLUNTEERING: usize = 5;
/// Reference blocks kept; the rest are dropped.
pub const MAX_REFERENCES: usize = 2;

/// Minimum remaining space (`y - bottom_margin`, in points) required to keep
/// drawing on the current page. Values are empirically tuned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowThresholds {
    /// Checked after the summary, before SKILLS.
    pub after_summary: f32,
    /// Checked after the skills, before WORK EXPERIENCE.
    pub after_skills: f32,
    /// Checked before every skill group.
    pub skill_group: f32,
    /// Checked before every job and every bullet after a job's first.
    pub experience_item: f32,
    /// Checked before PROJECTS.
    pub before_projects: f32,
    /// Checked before every project.
    pub project_item: f32,
    /// Checked before EDUCATION.
    pub before_education: f32,
    /// Checked before every education entry.
    pub education_item: f32,
    /// Checked before VOLUNTEERING & LEADERSHIP.
    pub before_volunteering: f32,
    /// REFERENCES are drawn only with at least this much space left.
    pub references_min: f32,
    /// Checked before every drawn line; keeps baselines above the margin.
    pub line_floor: f32,
}

impl Default for FlowThresholds {
    fn default() -> Self {
        Self {
            after_summary: 150.0,
            after_skills: 200.0,
            skill_group: 40.0,
            experience_item: 100.0,
            before_projects: 150.0,
            project_item: 120.0,
            before_education: 100.0,
            education_item: 50.0,
            before_volunteering: 100.0,
            references_min: 150.0,
            line_floor: 0.0,
        }
    }
}

/// Everything that parameterizes one render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub geometry: PageGeometry,
    pub thresholds: FlowThresholds,
    pub page_limit: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::a4(),
            thresholds: FlowThresholds::default(),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

// Typography.
const NAME: TextStyle = TextStyle::new(Font::HelveticaBold, 18.0, 18.0);
const JOB_TITLE: TextStyle = TextStyle::new(Font::Helvetica, 12.0, 15.0);
const CONTACT: TextStyle = TextStyle::new(Font::Helvetica, 10.0, 15.0);
const HEADING: TextStyle = TextStyle::new(Font::HelveticaBold, 12.0, 20.0);
const ITEM_TITLE: TextStyle = TextStyle::new(Font::HelveticaBold, 11.0, 15.0);
const BODY: TextStyle = TextStyle::new(Font::Helvetica, 10.0, 12.0);
const BODY_META: TextStyle = TextStyle::new(Font::Helvetica, 10.0, 15.0);
const PROJECT_TITLE: TextStyle = TextStyle::new(Font::HelveticaBold, 10.0, 12.0);
const TECHNOLOGIES: TextStyle = TextStyle::new(Font::Helvetica, 9.0, 10.0);
const COMPACT_BOLD: TextStyle = TextStyle::new(Font::HelveticaBold, 10.0, 10.0);
const COMPACT: TextStyle = TextStyle::new(Font::Helvetica, 10.0, 10.0);

// Vertical spacing, in points.
const MINOR_HEADING_ADVANCE: f32 = 15.0;
const SUMMARY_GAP: f32 = 5.0;
const SKILL_GROUP_GAP: f32 = 15.0;
const SKILLS_SECTION_GAP: f32 = 10.0;
const ITEM_GAP: f32 = 15.0;
const EDUCATION_GAP: f32 = 10.0;
const VOLUNTEERING_GAP: f32 = 10.0;
const REFERENCE_GAP: f32 = 5.0;

// Header rule.
const RULE_MARGIN: f32 = 20.0;
const RULE_WIDTH: f32 = 0.5;
const RULE_RAISE: f32 = 5.0;
const RULE_GAP: f32 = 15.0;

const CONTACT_SEPARATOR: &str = " | ";
const BULLET: &str = "• ";

// ────────────────────────────────────────────────────────────────────────────
// State
// ────────────────────────────────────────────────────────────────────────────

/// The cursor for one document render. Owned by `SectionFlow`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    pub x: f32,
    pub y: f32,
    /// 1-based page the cursor is on; never exceeds `page_limit`.
    pub page_index: u32,
    pub page_limit: u32,
}

/// The fixed section sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Header,
    Summary,
    Skills,
    Experience,
    Projects,
    Education,
    Volunteering,
    References,
    Done,
}

impl Section {
    fn next(self) -> Section {
        match self {
            Section::Header => Section::Summary,
            Section::Summary => Section::Skills,
            Section::Skills => Section::Experience,
            Section::Experience => Section::Projects,
            Section::Projects => Section::Education,
            Section::Education => Section::Volunteering,
            Section::Volunteering => Section::References,
            Section::References | Section::Done => Section::Done,
        }
    }
}

/// Result of a page-break check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBreak {
    /// Enough space remains; keep drawing on this page.
    Continue,
    /// The cursor moved to the top margin of the next page.
    PageBroke,
    /// The page limit is reached; stop drawing and finalize.
    DocumentFinalized,
}

/// How a section handler finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionEnd {
    Drawn,
    Skipped,
    Halted,
}

/// Whether drawing may go on after a gated step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Go,
    Halt,
}

/// Returns `Ok($halted)` from the enclosing function when `$step` halts.
macro_rules! or_halt {
    ($step:expr, $halted:expr) => {
        if $step == Step::Halt {
            return Ok($halted);
        }
    };
}

/// Summary of a completed render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSummary {
    pub page_count: u32,
    /// True when the page limit cut content from the document.
    pub truncated: bool,
    /// Sections that drew content, in order.
    pub sections: Vec<Section>,
}

/// A laid-out, not yet serialized document.
pub struct LaidOut<C> {
    pub canvas: C,
    pub summary: RenderSummary,
}

/// A finished document.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub bytes: Vec<u8>,
    pub summary: RenderSummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `cv` onto `canvas` without finalizing it.
pub fn lay_out<C: Canvas>(
    cv: &CvRecord,
    canvas: C,
    config: &LayoutConfig,
    corrector: &dyn TextCorrector,
) -> Result<LaidOut<C>, LayoutError> {
    SectionFlow::new(cv, canvas, config, corrector).run()
}

/// Lays out `cv` and finalizes the canvas into its byte format.
///
/// Either the whole (possibly truncated) document is returned or the first
/// measurement/drawing failure; partial output is never returned.
pub fn render_document<C: Canvas>(
    cv: &CvRecord,
    canvas: C,
    config: &LayoutConfig,
    corrector: &dyn TextCorrector,
) -> Result<RenderOutcome, LayoutError> {
    let LaidOut { canvas, summary } = lay_out(cv, canvas, config, corrector)?;
    let bytes = canvas.finalize()?;
    Ok(RenderOutcome { bytes, summary })
}

// ────────────────────────────────────────────────────────────────────────────
// Section content
// ────────────────────────────────────────────────────────────────────────────

struct JobEntry {
    heading: String,
    duration: String,
    bullets: Vec<String>,
}

struct ProjectEntry {
    heading: String,
    description: String,
    technologies: String,
}

struct EducationEntry {
    degree: String,
    institution: String,
    details: String,
    duration: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

pub struct SectionFlow<'a, C: Canvas> {
    cv: &'a CvRecord,
    canvas: C,
    config: &'a LayoutConfig,
    corrector: &'a dyn TextCorrector,
    state: LayoutState,
    /// A break moved the cursor to a page the canvas has not opened yet.
    page_pending: bool,
    finalized: bool,
    truncated: bool,
    /// Draw calls issued so far.
    draws: usize,
    drawn: Vec<Section>,
}

impl<'a, C: Canvas> SectionFlow<'a, C> {
    pub fn new(
        cv: &'a CvRecord,
        canvas: C,
        config: &'a LayoutConfig,
        corrector: &'a dyn TextCorrector,
    ) -> Self {
        let geometry = config.geometry;
        Self {
            cv,
            canvas,
            config,
            corrector,
            state: LayoutState {
                x: geometry.margin_left,
                y: geometry.top_y(),
                page_index: 1,
                page_limit: config.page_limit.max(1),
            },
            page_pending: false,
            finalized: false,
            truncated: false,
            draws: 0,
            drawn: Vec::new(),
        }
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// Drives the state machine to `Done`.
    pub fn run(mut self) -> Result<LaidOut<C>, LayoutError> {
        let mut section = Section::Header;
        while section != Section::Done {
            let draws_before = self.draws;
            let end = match section {
                Section::Header => self.draw_header()?,
                Section::Summary => self.draw_summary()?,
                Section::Skills => self.draw_skills()?,
                Section::Experience => self.draw_experience()?,
                Section::Projects => self.draw_projects()?,
                Section::Education => self.draw_education()?,
                Section::Volunteering => self.draw_volunteering()?,
                Section::References => self.draw_references()?,
                Section::Done => SectionEnd::Skipped,
            };
            match end {
                SectionEnd::Drawn => {
                    self.drawn.push(section);
                    section = section.next();
                }
                SectionEnd::Skipped => section = section.next(),
                SectionEnd::Halted => {
                    if self.draws > draws_before {
                        self.drawn.push(section);
                    }
                    section = Section::Done;
                }
            }
        }

        let summary = RenderSummary {
            page_count: self.canvas.page_count() as u32,
            truncated: self.truncated,
            sections: self.drawn,
        };
        Ok(LaidOut {
            canvas: self.canvas,
            summary,
        })
    }

    /// Breaks the page when less than `threshold` points remain above the
    /// bottom margin. At the page limit, finalizes instead; once finalized,
    /// every later check reports `DocumentFinalized`.
    pub fn check_page_break(&mut self, threshold: f32) -> PageBreak {
        if self.finalized {
            return PageBreak::DocumentFinalized;
        }
        let remaining = self.state.y - self.config.geometry.margin_bottom;
        if remaining >= threshold {
            return PageBreak::Continue;
        }
        if self.state.page_index >= self.state.page_limit {
            info!(
                page = self.state.page_index,
                remaining, threshold, "Page limit reached; truncating remaining content"
            );
            self.finalized = true;
            return PageBreak::DocumentFinalized;
        }
        self.state.page_index += 1;
        self.state.y = self.config.geometry.top_y();
        self.page_pending = true;
        debug!(
            page = self.state.page_index,
            remaining, threshold, "Page break"
        );
        PageBreak::PageBroke
    }

    // ── helpers ─────────────────────────────────────────────────────────────

    /// Checks the page ahead of content that is about to be drawn. A halt
    /// here drops that content, so the render is marked truncated.
    fn gate(&mut self, threshold: f32) -> Step {
        match self.check_page_break(threshold) {
            PageBreak::DocumentFinalized => {
                self.truncated = true;
                Step::Halt
            }
            PageBreak::Continue | PageBreak::PageBroke => Step::Go,
        }
    }

    fn content_width(&self) -> f32 {
        self.config.geometry.content_width()
    }

    fn open_pending_page(&mut self) -> Result<(), LayoutError> {
        if self.page_pending {
            self.canvas.new_page()?;
            self.page_pending = false;
        }
        Ok(())
    }

    fn put(&mut self, x: f32, text: &str, style: TextStyle) -> Result<(), LayoutError> {
        self.open_pending_page()?;
        self.canvas
            .draw_text(x, self.state.y, text, style.font, style.size)?;
        self.draws += 1;
        Ok(())
    }

    fn put_centered(&mut self, text: &str, style: TextStyle) -> Result<(), LayoutError> {
        self.open_pending_page()?;
        let center_x = self.config.geometry.center_x();
        self.canvas
            .draw_centered_text(center_x, self.state.y, text, style.font, style.size)?;
        self.draws += 1;
        Ok(())
    }

    /// Draws one line at `x` and advances by `advance`, unless the line floor
    /// finalizes the document first.
    fn line(
        &mut self,
        x: f32,
        text: &str,
        style: TextStyle,
        advance: f32,
    ) -> Result<Step, LayoutError> {
        or_halt!(self.gate(self.config.thresholds.line_floor), Step::Halt);
        self.put(x, text, style)?;
        self.state.y -= advance;
        Ok(Step::Go)
    }

    /// Draws one line of `text`, shortened to fit the content width, and
    /// advances by the style's leading. Blank text draws and advances nothing.
    fn single_line(&mut self, text: &str, style: TextStyle) -> Result<Step, LayoutError> {
        let text = single_line(text);
        if text.is_empty() {
            return Ok(Step::Go);
        }
        let fitted = ellipsize_to_width(&self.canvas, &text, self.content_width(), style)?;
        self.line(self.state.x, &fitted, style, style.line_height)
    }

    /// Draws `text` wrapped at the content width, one leading per line.
    fn wrapped(&mut self, text: &str, style: TextStyle) -> Result<Step, LayoutError> {
        for line in wrap_lines(&self.canvas, text, self.content_width(), style)? {
            or_halt!(
                self.line(self.state.x, &line, style, style.line_height)?,
                Step::Halt
            );
        }
        Ok(Step::Go)
    }

    fn heading(&mut self, label: &str, advance: f32) -> Result<Step, LayoutError> {
        self.line(self.state.x, label, HEADING, advance)
    }

    /// Draws a bullet item with a hanging indent: "• " on the first line,
    /// continuation lines aligned with the text after it.
    fn bullet(&mut self, text: &str, style: TextStyle) -> Result<Step, LayoutError> {
        let indent = self
            .canvas
            .measure_text_width(BULLET, style.font, style.size)?;
        let lines = wrap_lines(&self.canvas, text, self.content_width() - indent, style)?;
        for (i, line) in lines.iter().enumerate() {
            let step = if i == 0 {
                self.line(
                    self.state.x,
                    &format!("{BULLET}{line}"),
                    style,
                    style.line_height,
                )?
            } else {
                self.line(self.state.x + indent, line, style, style.line_height)?
            };
            or_halt!(step, Step::Halt);
        }
        Ok(Step::Go)
    }

    /// Draws `text` as justified paragraphs, checking the line floor before
    /// every line. An empty paragraph draws nothing and advances one leading.
    fn justified(&mut self, text: &str, style: TextStyle) -> Result<Step, LayoutError> {
        let width = self.content_width();
        for lines in justify_paragraphs(&self.canvas, text, width, style)? {
            if lines.is_empty() {
                self.state.y -= style.line_height;
                continue;
            }
            for line in &lines {
                or_halt!(self.gate(self.config.thresholds.line_floor), Step::Halt);
                for placed in line {
                    self.put(self.state.x + placed.x_offset, &placed.text, style)?;
                }
                self.state.y -= style.line_height;
            }
            self.state.y -= PARAGRAPH_GAP;
        }
        Ok(Step::Go)
    }

    fn prose(&self, text: &str) -> String {
        normalize(&self.corrector.correct(text))
    }

    // ── sections ────────────────────────────────────────────────────────────

    fn draw_header(&mut self) -> Result<SectionEnd, LayoutError> {
        let width = self.content_width();
        let center_x = self.config.geometry.center_x();

        let name = ellipsize_to_width(&self.canvas, &single_line(&self.cv.name), width, NAME)?;
        let job_title = ellipsize_to_width(
            &self.canvas,
            &single_line(&self.cv.job_title),
            width,
            JOB_TITLE,
        )?;
        let contact_line = self
            .cv
            .contact
            .parts()
            .into_iter()
            .map(single_line)
            .collect::<Vec<_>>()
            .join(CONTACT_SEPARATOR);

        let mut widest = 0.0_f32;

        if !name.is_empty() {
            self.put_centered(&name, NAME)?;
            widest = widest.max(self.canvas.measure_text_width(&name, NAME.font, NAME.size)?);
        }
        self.state.y -= NAME.line_height;

        if !job_title.is_empty() {
            self.put_centered(&job_title, JOB_TITLE)?;
            widest = widest.max(self.canvas.measure_text_width(
                &job_title,
                JOB_TITLE.font,
                JOB_TITLE.size,
            )?);
            self.state.y -= JOB_TITLE.line_height;
        }

        for line in wrap_lines(&self.canvas, &contact_line, width, CONTACT)? {
            self.put_centered(&line, CONTACT)?;
            widest =
                widest.max(self.canvas.measure_text_width(&line, CONTACT.font, CONTACT.size)?);
            self.state.y -= CONTACT.line_height;
        }

        let half = widest / 2.0 + RULE_MARGIN;
        let rule_y = self.state.y + RULE_RAISE;
        self.canvas
            .draw_line(center_x - half, rule_y, center_x + half, rule_y, RULE_WIDTH)?;
        self.draws += 1;
        self.state.y = rule_y - RULE_GAP;
        Ok(SectionEnd::Drawn)
    }

    fn draw_summary(&mut self) -> Result<SectionEnd, LayoutError> {
        let text = self.prose(&self.cv.profile_summary);
        or_halt!(self.justified(&text, BODY)?, SectionEnd::Halted);
        self.state.y -= SUMMARY_GAP;
        Ok(SectionEnd::Drawn)
    }

    fn draw_skills(&mut self) -> Result<SectionEnd, LayoutError> {
        or_halt!(
            self.gate(self.config.thresholds.after_summary),
            SectionEnd::Halted
        );
        or_halt!(
            self.heading("SKILLS", HEADING.line_height)?,
            SectionEnd::Halted
        );

        let cv = self.cv;
        let width = self.content_width();
        for group in &cv.skills {
            let category = single_line(&group.category);
            let items = group
                .items
                .iter()
                .map(|item| single_line(item))
                .filter(|item| !item.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if category.is_empty() && items.is_empty() {
                continue;
            }

            or_halt!(
                self.gate(self.config.thresholds.skill_group),
                SectionEnd::Halted
            );
            or_halt!(
                self.single_line(&category, ITEM_TITLE)?,
                SectionEnd::Halted
            );
            let lines = wrap_lines(&self.canvas, &items, width, BODY)?;
            for line in &lines {
                or_halt!(
                    self.line(self.state.x, line, BODY, BODY.line_height)?,
                    SectionEnd::Halted
                );
            }
            // The last item line shares its leading with the group gap.
            self.state.y -= if lines.is_empty() {
                SKILL_GROUP_GAP
            } else {
                SKILL_GROUP_GAP - BODY.line_height
            };
        }
        self.state.y -= SKILLS_SECTION_GAP;
        Ok(SectionEnd::Drawn)
    }

    fn draw_experience(&mut self) -> Result<SectionEnd, LayoutError> {
        let jobs: Vec<JobEntry> = self
            .cv
            .experience
            .iter()
            .map(|job| JobEntry {
                heading: single_line(&job.heading()),
                duration: single_line(&job.duration),
                bullets: job
                    .responsibilities
                    .iter()
                    .map(|r| prepare_list_item(&self.prose(r)))
                    .filter(|item| !item.is_empty())
                    .collect(),
            })
            .filter(|job| {
                !job.heading.is_empty() || !job.duration.is_empty() || !job.bullets.is_empty()
            })
            .collect();
        if jobs.is_empty() {
            return Ok(SectionEnd::Skipped);
        }

        or_halt!(
            self.gate(self.config.thresholds.after_skills),
            SectionEnd::Halted
        );
        or_halt!(
            self.heading("WORK EXPERIENCE", HEADING.line_height)?,
            SectionEnd::Halted
        );
        let threshold = self.config.thresholds.experience_item;
        for job in &jobs {
            or_halt!(self.gate(threshold), SectionEnd::Halted);
            or_halt!(
                self.single_line(&job.heading, ITEM_TITLE)?,
                SectionEnd::Halted
            );
            or_halt!(
                self.single_line(&job.duration, BODY_META)?,
                SectionEnd::Halted
            );
            for (i, bullet) in job.bullets.iter().enumerate() {
                // The first bullet stays with its job heading.
                if i > 0 {
                    or_halt!(self.gate(threshold), SectionEnd::Halted);
                }
                or_halt!(self.bullet(bullet, BODY)?, SectionEnd::Halted);
            }
            self.state.y -= ITEM_GAP;
        }
        Ok(SectionEnd::Drawn)
    }

    fn draw_projects(&mut self) -> Result<SectionEnd, LayoutError> {
        let projects: Vec<ProjectEntry> = self
            .cv
            .projects
            .iter()
            .map(|project| {
                let technologies = project
                    .technologies
                    .iter()
                    .map(|t| single_line(t))
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>();
                ProjectEntry {
                    heading: single_line(&project.heading()),
                    description: normalize(&single_line(&self.prose(&project.description))),
                    technologies: if technologies.is_empty() {
                        String::new()
                    } else {
                        format!("Technologies: {}", technologies.join(", "))
                    },
                }
            })
            .filter(|p| {
                !p.heading.is_empty() || !p.description.is_empty() || !p.technologies.is_empty()
            })
            .collect();
        if projects.is_empty() {
            return Ok(SectionEnd::Skipped);
        }

        or_halt!(
            self.gate(self.config.thresholds.before_projects),
            SectionEnd::Halted
        );
        or_halt!(
            self.heading("PROJECTS", HEADING.line_height)?,
            SectionEnd::Halted
        );
        for project in &projects {
            or_halt!(
                self.gate(self.config.thresholds.project_item),
                SectionEnd::Halted
            );
            or_halt!(
                self.single_line(&project.heading, PROJECT_TITLE)?,
                SectionEnd::Halted
            );
            or_halt!(
                self.justified(&project.description, BODY)?,
                SectionEnd::Halted
            );
            or_halt!(
                self.wrapped(&project.technologies, TECHNOLOGIES)?,
                SectionEnd::Halted
            );
            self.state.y -= ITEM_GAP;
        }
        Ok(SectionEnd::Drawn)
    }

    fn draw_education(&mut self) -> Result<SectionEnd, LayoutError> {
        let entries: Vec<EducationEntry> = self
            .cv
            .education
            .iter()
            .map(|entry| EducationEntry {
                degree: single_line(&entry.degree),
                institution: single_line(&entry.institution),
                details: single_line(&entry.details),
                duration: single_line(&entry.duration),
            })
            .filter(|e| {
                !e.degree.is_empty()
                    || !e.institution.is_empty()
                    || !e.details.is_empty()
                    || !e.duration.is_empty()
            })
            .collect();
        if entries.is_empty() {
            return Ok(SectionEnd::Skipped);
        }

        or_halt!(
            self.gate(self.config.thresholds.before_education),
            SectionEnd::Halted
        );
        or_halt!(
            self.heading("EDUCATION", MINOR_HEADING_ADVANCE)?,
            SectionEnd::Halted
        );
        for entry in &entries {
            or_halt!(
                self.gate(self.config.thresholds.education_item),
                SectionEnd::Halted
            );
            or_halt!(
                self.single_line(&entry.degree, COMPACT_BOLD)?,
                SectionEnd::Halted
            );
            or_halt!(
                self.single_line(&entry.institution, COMPACT_BOLD)?,
                SectionEnd::Halted
            );
            or_halt!(self.wrapped(&entry.details, COMPACT)?, SectionEnd::Halted);
            or_halt!(
                self.single_line(&entry.duration, COMPACT)?,
                SectionEnd::Halted
            );
            self.state.y -= EDUCATION_GAP;
        }
        Ok(SectionEnd::Drawn)
    }

    fn draw_volunteering(&mut self) -> Result<SectionEnd, LayoutError> {
        let entries: Vec<String> = self
            .cv
            .volunteering_and_leadership
            .iter()
            .map(|v| single_line(v))
            .filter(|v| !v.is_empty())
            .take(MAX_VOLUNTEERING)
            .collect();
        if entries.is_empty() {
            return Ok(SectionEnd::Skipped);
        }

        or_halt!(
            self.gate(self.config.thresholds.before_volunteering),
            SectionEnd::Halted
        );
        or_halt!(
            self.heading("VOLUNTEERING & LEADERSHIP", MINOR_HEADING_ADVANCE)?,
            SectionEnd::Halted
        );
        let indent = self
            .canvas
            .measure_text_width(BULLET, BODY.font, BODY.size)?;
        let available = self.content_width() - indent;
        for entry in entries {
            let text = truncate_with_ellipsis(&entry, SHORT_ITEM_MAX_CHARS);
            let text = ellipsize_to_width(&self.canvas, &text, available, BODY)?;
            or_halt!(
                self.line(
                    self.state.x,
                    &format!("{BULLET}{text}"),
                    BODY,
                    BODY.line_height
                )?,
                SectionEnd::Halted
            );
        }
        self.state.y -= VOLUNTEERING_GAP;
        Ok(SectionEnd::Drawn)
    }

    fn draw_references(&mut self) -> Result<SectionEnd, LayoutError> {
        let cv = self.cv;
        if cv.references.is_empty() {
            return Ok(SectionEnd::Skipped);
        }
        let remaining = self.state.y - self.config.geometry.margin_bottom;
        if remaining < self.config.thresholds.references_min {
            debug!(remaining, "Not enough space for references; dropping section");
            return Ok(SectionEnd::Skipped);
        }

        // Two blocks fit well inside `references_min`, so the line floor
        // below never breaks the page here.
        or_halt!(
            self.heading("REFERENCES", MINOR_HEADING_ADVANCE)?,
            SectionEnd::Halted
        );
        for reference in cv.references.iter().take(MAX_REFERENCES) {
            for (text, style) in [
                (&reference.name, COMPACT_BOLD),
                (&reference.title, COMPACT),
                (&reference.phone, COMPACT),
                (&reference.email, COMPACT),
            ] {
                or_halt!(self.single_line(text, style)?, SectionEnd::Halted);
            }
            self.state.y -= REFERENCE_GAP;
        }
        Ok(SectionEnd::Drawn)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
