//! The task collection store: an ordered `Vec<Task>` mirrored to the
//! `taskboard:v1` slot on every mutation. Views never own task state; they
//! borrow it through `filter`/`column`.

use uuid::Uuid;

use crate::error::Result;
use crate::storage::{Storage, TASKS_SLOT};
use crate::task::{Status, StatusFilter, Task, TaskPatch};

#[derive(Debug)]
pub struct Board {
    storage: Storage,
    tasks: Vec<Task>,
}

impl Board {
    /// Hydrates the board from the slot. An absent slot yields the seed
    /// (empty, or a small demo set when asked); a malformed slot has
    /// already been logged by `Storage` and yields empty.
    pub fn load(storage: Storage, seed_demo: bool) -> Result<Self> {
        let mut board = if storage.exists(TASKS_SLOT) {
            Self {
                tasks: storage.read(TASKS_SLOT).unwrap_or_default(),
                storage,
            }
        } else {
            Self {
                tasks: if seed_demo { demo_tasks() } else { Vec::new() },
                storage,
            }
        };
        if !board.storage.exists(TASKS_SLOT) {
            board.save()?;
        }
        Ok(board)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn save(&self) -> Result<()> {
        self.storage.write(TASKS_SLOT, &self.tasks)
    }

    /// Creates a task at the front of the collection. A blank or
    /// whitespace-only title is a no-op and returns `None`.
    pub fn create(&mut self, title: &str, status: Status) -> Result<Option<Uuid>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let task = Task::new(title, status);
        let id = task.id;
        self.tasks.insert(0, task);
        self.save()?;
        Ok(Some(id))
    }

    /// Merges the given fields into the matching task. An absent id is a
    /// no-op; returns whether anything was written.
    pub fn patch(&mut self, id: Uuid, patch: TaskPatch) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(done) = patch.done {
            task.done = done;
        }
        if let Some(last_status) = patch.last_status {
            task.last_status = last_status;
        }
        self.save()?;
        Ok(true)
    }

    /// Moves a task to a column, keeping `done == (status == Done)`.
    /// Completing records the column it came from so the checkbox can put
    /// it back.
    pub fn set_status(&mut self, id: Uuid, status: Status) -> Result<bool> {
        let Some(task) = self.get(id) else {
            return Ok(false);
        };
        let last_status = if status == Status::Done && task.status != Status::Done {
            Some(task.status)
        } else {
            None
        };
        self.patch(
            id,
            TaskPatch {
                status: Some(status),
                done: Some(status == Status::Done),
                last_status: Some(last_status),
                ..TaskPatch::default()
            },
        )
    }

    /// The done checkbox. Checking completes the task; unchecking returns
    /// it to the column it was in before completion, or To Do when that is
    /// unknown.
    pub fn set_done(&mut self, id: Uuid, done: bool) -> Result<bool> {
        if done {
            return self.set_status(id, Status::Done);
        }
        let Some(task) = self.get(id) else {
            return Ok(false);
        };
        let target = match task.last_status {
            Some(status) if status != Status::Done => status,
            _ => Status::Todo,
        };
        self.set_status(id, target)
    }

    /// Removes the matching task; an absent id is a no-op. Any confirmation
    /// prompt belongs to the presentation layer, not here.
    pub fn remove(&mut self, id: Uuid) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Derived view over the collection; pure, order-preserving.
    pub fn filter(&self, query: &str, filter: StatusFilter) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.matches(query, filter))
            .collect()
    }

    /// One column of the filtered view.
    pub fn column(&self, status: Status, query: &str, filter: StatusFilter) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == status && t.matches(query, filter))
            .collect()
    }
}

fn demo_tasks() -> Vec<Task> {
    let mut welcome = Task::new("Welcome to taskboard", Status::Todo);
    welcome.description = "Press n to add a task, g to grab and move one.".to_string();
    let mut moving = Task::new("Try moving a card", Status::InProgress);
    moving.description = "Grab with g, carry with the arrow keys, drop with Enter.".to_string();
    let finished = Task::new("Read the footer hints", Status::Done);
    vec![welcome, moving, finished]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn empty_board(dir: &tempfile::TempDir) -> Board {
        let storage = Storage::open(dir.path()).unwrap();
        Board::load(storage, false).unwrap()
    }

    #[test]
    fn create_inserts_at_the_front() {
        let dir = tempdir().unwrap();
        let mut board = empty_board(&dir);
        board.create("first", Status::Todo).unwrap();
        let id = board.create("second", Status::Done).unwrap().unwrap();
        assert_eq!(board.tasks()[0].id, id);
        assert_eq!(board.tasks()[0].title, "second");
        assert!(board.tasks()[0].done);
        assert_eq!(board.tasks().len(), 2);
    }

    #[test]
    fn blank_title_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mut board = empty_board(&dir);
        assert_eq!(board.create("", Status::Todo).unwrap(), None);
        assert_eq!(board.create("   ", Status::Todo).unwrap(), None);
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn patch_touches_only_the_named_fields() {
        let dir = tempdir().unwrap();
        let mut board = empty_board(&dir);
        let id = board.create("original", Status::Todo).unwrap().unwrap();
        let other = board.create("other", Status::InProgress).unwrap().unwrap();
        let patched = board
            .patch(
                id,
                TaskPatch {
                    title: Some("renamed".to_string()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert!(patched);
        let task = board.get(id).unwrap();
        assert_eq!(task.title, "renamed");
        assert_eq!(task.status, Status::Todo);
        assert_eq!(board.get(other).unwrap().title, "other");
    }

    #[test]
    fn patch_on_unknown_id_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mut board = empty_board(&dir);
        board.create("a", Status::Todo).unwrap();
        let patched = board
            .patch(
                Uuid::new_v4(),
                TaskPatch {
                    title: Some("x".to_string()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert!(!patched);
        assert_eq!(board.tasks()[0].title, "a");
    }

    #[test]
    fn remove_deletes_exactly_one_and_tolerates_unknown_ids() {
        let dir = tempdir().unwrap();
        let mut board = empty_board(&dir);
        let id = board.create("a", Status::Todo).unwrap().unwrap();
        board.create("b", Status::Todo).unwrap();
        assert!(board.remove(id).unwrap());
        assert!(!board.remove(id).unwrap());
        assert_eq!(board.tasks().len(), 1);
    }

    #[test]
    fn completing_records_the_prior_column_and_unchecking_restores_it() {
        let dir = tempdir().unwrap();
        let mut board = empty_board(&dir);
        let id = board.create("a", Status::InProgress).unwrap().unwrap();
        board.set_done(id, true).unwrap();
        let task = board.get(id).unwrap();
        assert_eq!(task.status, Status::Done);
        assert!(task.done);
        assert_eq!(task.last_status, Some(Status::InProgress));

        board.set_done(id, false).unwrap();
        let task = board.get(id).unwrap();
        assert_eq!(task.status, Status::InProgress);
        assert!(!task.done);
    }

    #[test]
    fn unchecking_without_history_falls_back_to_todo() {
        let dir = tempdir().unwrap();
        let mut board = empty_board(&dir);
        let id = board.create("a", Status::Done).unwrap().unwrap();
        board.set_done(id, false).unwrap();
        assert_eq!(board.get(id).unwrap().status, Status::Todo);
    }

    #[test]
    fn filter_with_empty_query_and_all_returns_everything_in_order() {
        let dir = tempdir().unwrap();
        let mut board = empty_board(&dir);
        board.create("one", Status::Todo).unwrap();
        board.create("two", Status::Done).unwrap();
        let view = board.filter("", StatusFilter::All);
        let titles: Vec<_> = view.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["two", "one"]);
    }

    #[test]
    fn filter_combines_query_and_status_predicate() {
        let dir = tempdir().unwrap();
        let mut board = empty_board(&dir);
        board.create("foo open", Status::Todo).unwrap();
        board.create("foo done", Status::Done).unwrap();
        board.create("bar done", Status::Done).unwrap();
        let view = board.filter("foo", StatusFilter::Done);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "foo done");
    }

    #[test]
    fn collection_round_trips_through_the_slot() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let mut board = Board::load(storage.clone(), false).unwrap();
        let id = board.create("persisted", Status::InProgress).unwrap().unwrap();
        board
            .patch(
                id,
                TaskPatch {
                    description: Some("with a description".to_string()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        let reloaded = Board::load(storage, false).unwrap();
        assert_eq!(reloaded.tasks(), board.tasks());
    }

    #[test]
    fn seed_demo_applies_only_when_the_slot_is_absent() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let board = Board::load(storage.clone(), true).unwrap();
        assert!(!board.tasks().is_empty());

        // Slot now exists; a later load must not reseed over user data.
        let mut board = Board::load(storage.clone(), true).unwrap();
        let ids: Vec<Uuid> = board.tasks().iter().map(|t| t.id).collect();
        for id in ids {
            board.remove(id).unwrap();
        }
        let board = Board::load(storage, true).unwrap();
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn malformed_slot_loads_as_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("taskboard.v1.json"), "[{broken").unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let board = Board::load(storage, true).unwrap();
        assert!(board.tasks().is_empty());
    }
}
