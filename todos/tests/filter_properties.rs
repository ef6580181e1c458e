//! Properties of the filter projection and the commands derived from it.

use proptest::prelude::*;
use todos::edit::{reconcile, EditOutcome};
use todos::filter::{count_active, count_completed, project};
use todos::{bulk, Filter, Todo, TodoAction, TodoId, UserId};

fn todos_strategy() -> impl Strategy<Value = Vec<Todo>> {
    prop::collection::vec((any::<bool>(), "[a-z ]{1,12}"), 0..24).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(index, (completed, title))| {
                Todo::new(TodoId::new(index as u64 + 1), UserId::new(1), title, completed)
            })
            .collect()
    })
}

fn filter_strategy() -> impl Strategy<Value = Filter> {
    prop_oneof![Just(Filter::All), Just(Filter::Active), Just(Filter::Completed)]
}

proptest! {
    #[test]
    fn projection_keeps_matching_items_in_order(todos in todos_strategy(), filter in filter_strategy()) {
        let projected = project(filter, &todos);

        prop_assert!(projected.iter().all(|todo| filter.matches(todo)));
        prop_assert!(projected.windows(2).all(|pair| pair[0].id < pair[1].id));

        let expected = todos.iter().filter(|todo| filter.matches(todo)).count();
        prop_assert_eq!(projected.len(), expected);
    }

    #[test]
    fn all_is_identity(todos in todos_strategy()) {
        let projected: Vec<Todo> = project(Filter::All, &todos).into_iter().cloned().collect();
        prop_assert_eq!(projected, todos);
    }

    #[test]
    fn counts_partition_the_collection(todos in todos_strategy()) {
        prop_assert_eq!(count_active(&todos) + count_completed(&todos), todos.len());
        prop_assert_eq!(count_active(&todos), project(Filter::Active, &todos).len());
    }

    #[test]
    fn toggle_all_targets_active_items_or_everything(todos in todos_strategy()) {
        let actions = bulk::toggle_all(&todos);
        let active = count_active(&todos);

        if active > 0 {
            prop_assert_eq!(actions.len(), active);
        } else {
            prop_assert_eq!(actions.len(), todos.len());
        }

        for action in actions {
            match action {
                TodoAction::UpdateTodo { todo, .. } => {
                    prop_assert_eq!(todo.completed, active > 0);
                },
                other => {
                    prop_assert!(false, "unexpected action {:?}", other);
                },
            }
        }
    }

    #[test]
    fn edit_outcome_follows_trimmed_title(original in "[a-z]{1,8}", typed in "[ a-z]{0,10}") {
        let todo = Todo::new(TodoId::new(1), UserId::new(1), original.clone(), false);
        let trimmed = typed.trim();

        match reconcile(&todo, &typed) {
            EditOutcome::Unchanged => {
                prop_assert_eq!(trimmed, original.as_str());
            },
            EditOutcome::Delete(id) => {
                prop_assert!(trimmed.is_empty());
                prop_assert_eq!(id, TodoId::new(1));
            },
            EditOutcome::Rename(renamed) => {
                prop_assert_eq!(renamed.title.as_str(), trimmed);
                prop_assert_ne!(trimmed, original.as_str());
            },
        }
    }
}
