//! The demo feed: a notes list and an issue tracker, each under its own
//! header, joined into one scrolling list.

use std::fmt;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use joiner_core::{Joiner, ListSection, LocalType, PlaceholderSection, SectionKey};

pub const HEADER_TYPE: LocalType = 0;
pub const OPEN_ISSUE: LocalType = 1;
pub const CLOSED_ISSUE: LocalType = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Issue {
    pub id: u64,
    pub title: String,
    pub open: bool,
}

/// What the list renders in one slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    Header(&'static str),
    Note(String),
    Issue { id: u64, title: String, open: bool },
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Row::Header(title) => write!(f, "== {title} =="),
            Row::Note(text) => write!(f, "  * {text}"),
            Row::Issue { id, title, open } => {
                let mark = if *open { ' ' } else { 'x' };
                write!(f, "  [{mark}] #{id} {title}")
            }
        }
    }
}

/// The model a clicked slot resolved to.
#[derive(Debug)]
pub enum Clicked {
    Header(&'static str),
    Note { index: usize, text: String },
    Issue { index: usize, issue: Issue },
}

pub struct Feed {
    pub joiner: Joiner<Row>,
    pub notes_header: Rc<PlaceholderSection<Row>>,
    pub notes: Rc<ListSection<String, Row>>,
    pub issues_header: Rc<PlaceholderSection<Row>>,
    pub issues: Rc<ListSection<Issue, Row>>,
}

impl Feed {
    pub fn new(notes: Vec<String>, issues: Vec<Issue>) -> Result<Self> {
        let joiner: Joiner<Row> = Joiner::new();
        let notes_header = header("Notes", 1);
        let issues_header = header("Issues", 2);
        let notes: Rc<ListSection<String, Row>> = Rc::new(ListSection::new(notes, |_, text| {
            Row::Note(text.clone())
        }));
        let issues: Rc<ListSection<Issue, Row>> = Rc::new(
            ListSection::new(issues, |_, issue: &Issue| Row::Issue {
                id: issue.id,
                title: issue.title.clone(),
                open: issue.open,
            })
            .with_types(&[OPEN_ISSUE, CLOSED_ISSUE], |issue| {
                if issue.open {
                    OPEN_ISSUE
                } else {
                    CLOSED_ISSUE
                }
            })
            .with_ids(|issue| issue.id),
        );

        joiner
            .add(notes_header.clone())
            .context("adding notes header")?;
        joiner.add(notes.clone()).context("adding notes")?;
        joiner
            .add(issues_header.clone())
            .context("adding issues header")?;
        joiner.add(issues.clone()).context("adding issues")?;

        Ok(Self {
            joiner,
            notes_header,
            notes,
            issues_header,
            issues,
        })
    }

    pub fn close_issue(&self, id: u64) -> Result<()> {
        let Some(index) = self.issue_index(id) else {
            bail!("no issue #{id}");
        };
        self.issues.update(index, |issue| issue.open = false);
        Ok(())
    }

    pub fn remove_issue(&self, id: u64) -> Result<Issue> {
        let index = self
            .issue_index(id)
            .with_context(|| format!("no issue #{id}"))?;
        self.issues
            .remove(index)
            .with_context(|| format!("issue #{id} vanished"))
    }

    fn issue_index(&self, id: u64) -> Option<usize> {
        self.issues.to_vec().iter().position(|issue| issue.id == id)
    }

    /// Maps a slot of the joined list back to the model behind it.
    pub fn click(&self, slot: usize) -> Result<Clicked> {
        let info = self
            .joiner
            .slot_info(slot)
            .with_context(|| format!("slot {slot} is outside the feed"))?;
        let owner = SectionKey::of(&info.section);
        let index = info.real_index;

        if owner == SectionKey::of(&self.notes) {
            let text = self.notes.get(index).context("stale note slot")?;
            Ok(Clicked::Note { index, text })
        } else if owner == SectionKey::of(&self.issues) {
            let issue = self.issues.get(index).context("stale issue slot")?;
            Ok(Clicked::Issue { index, issue })
        } else if owner == SectionKey::of(&self.notes_header) {
            Ok(Clicked::Header("Notes"))
        } else if owner == SectionKey::of(&self.issues_header) {
            Ok(Clicked::Header("Issues"))
        } else {
            bail!("slot {slot} belongs to an unknown section")
        }
    }

    /// Reads every slot through the surface, as a list view would.
    pub fn render(&self) -> Result<Vec<Row>> {
        let surface = self.joiner.surface();
        (0..surface.item_count())
            .map(|slot| {
                surface
                    .content_at(slot)
                    .with_context(|| format!("reading slot {slot}"))
            })
            .collect()
    }
}

fn header(title: &'static str, id: u64) -> Rc<PlaceholderSection<Row>> {
    Rc::new(
        PlaceholderSection::new(move || Row::Header(title))
            .with_type(HEADER_TYPE)
            .with_stable_id(id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Feed {
        Feed::new(
            vec!["buy milk".into(), "call home".into()],
            vec![
                Issue {
                    id: 7,
                    title: "crash on start".into(),
                    open: true,
                },
                Issue {
                    id: 8,
                    title: "typo".into(),
                    open: false,
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn click_resolves_models_across_sections() {
        let feed = sample();
        assert!(matches!(feed.click(0).unwrap(), Clicked::Header("Notes")));
        assert!(matches!(
            feed.click(2).unwrap(),
            Clicked::Note { index: 1, .. }
        ));
        match feed.click(5).unwrap() {
            Clicked::Issue { index, issue } => {
                assert_eq!(index, 1);
                assert_eq!(issue.id, 8);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(feed.click(6).is_err());
    }

    #[test]
    fn closing_an_issue_changes_its_type() {
        let feed = sample();
        let surface = feed.joiner.surface();
        let open = surface.type_at(4).unwrap();

        feed.close_issue(7).unwrap();

        assert_ne!(surface.type_at(4).unwrap(), open);
        assert_eq!(surface.type_at(4).unwrap(), surface.type_at(5).unwrap());
        assert!(feed.close_issue(99).is_err());
    }

    #[test]
    fn hidden_header_disappears_from_render() {
        let feed = sample();
        feed.notes_header.set_visible(false);
        let rows = feed.render().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], Row::Note("buy milk".into()));
    }
}
