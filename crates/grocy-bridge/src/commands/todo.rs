//! Todo list commands.

use tabled::Tabled;

use grocy_core::{Coordinator, CoordinatorConfig, NewTodoItem, TodoItem, TodoStatus};

use crate::cli::{GlobalOpts, TodoArgs, TodoCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct TodoRow {
    #[tabled(rename = "UID")]
    uid: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Due")]
    due: String,
}

fn to_row(item: &TodoItem, color: bool) -> TodoRow {
    let status = item.status.to_string();
    TodoRow {
        uid: item.uid.clone(),
        status: output::highlight(&status, item.status == TodoStatus::NeedsAction, color),
        summary: item.summary.clone(),
        due: item.due.map(|d| d.to_string()).unwrap_or_default(),
    }
}

pub async fn handle(
    config: CoordinatorConfig,
    args: TodoArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TodoCommand::List { key } => {
            let items = Coordinator::oneshot(config, |c| async move { c.todo_items(key) }).await?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &items,
                |i| to_row(i, color),
                |i| i.uid.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TodoCommand::Add {
            key,
            summary,
            description,
            due,
        } => {
            let item = NewTodoItem {
                summary,
                description,
                due,
            };
            let result =
                Coordinator::oneshot(config, |c| async move { c.create_todo_item(key, &item).await })
                    .await?;
            let out = output::render_single(
                &global.output,
                &result,
                util::result_detail,
                |_| key.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TodoCommand::Complete { key, uid } => {
            let target = uid.clone();
            Coordinator::oneshot(config, |c| async move {
                c.update_todo_item(key, &target, TodoStatus::Completed).await
            })
            .await?;
            if !global.quiet {
                eprintln!("Completed {uid} on {key}");
            }
            Ok(())
        }

        TodoCommand::Delete { key, uids } => {
            let prompt = format!("Delete {} item(s) from {key}?", uids.len());
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            let count = uids.len();
            Coordinator::oneshot(config, |c| async move { c.delete_todo_items(key, &uids).await })
                .await?;
            if !global.quiet {
                eprintln!("Deleted {count} item(s) from {key}");
            }
            Ok(())
        }
    }
}
