//! Notification text templates.

use super::payload::{GithubEvent, PushPayload, StarAction, StarPayload, WorkflowRunPayload};
use super::preview::{self, Clock};
use super::Notification;

/// Renders a decoded event.
pub(super) fn render(event: &GithubEvent, clock: &dyn Clock) -> Notification {
    match event {
        GithubEvent::Star { action, payload } => render_star(*action, payload, clock),
        GithubEvent::Push(payload) => render_push(payload),
        GithubEvent::WorkflowRunCompleted(payload) => render_workflow_run(payload),
    }
}

fn render_star(action: StarAction, payload: &StarPayload, clock: &dyn Clock) -> Notification {
    let repo = &payload.repository;
    let text = match action {
        StarAction::Created => format!(
            "{} starred {} (total {} stars)",
            payload.sender.login, repo.full_name, repo.stargazers_count
        ),
        StarAction::Deleted => format!(
            "{} unstarred {} (remaining {} stars)",
            payload.sender.login, repo.full_name, repo.stargazers_count
        ),
    };

    let image = preview::preview_image(&repo.html_url, &preview::time_seed(clock));
    Notification::new(text).with_attachments(image)
}

fn render_push(payload: &PushPayload) -> Notification {
    let repo = &payload.repository;
    let header = format!(
        "{} pushed to {} (total {} stars):",
        payload.pusher.name, repo.full_name, repo.stargazers_count
    );
    let text = std::iter::once(header)
        .chain(
            payload
                .commits
                .iter()
                .map(|commit| format!("-- {}", headline(&commit.message))),
        )
        .chain(std::iter::once(format!("Compare: {}", payload.compare)))
        .collect::<Vec<_>>()
        .join("\n");

    let images = payload
        .commits
        .iter()
        .filter_map(|commit| preview::preview_image(&commit.url, &commit.id));

    Notification::new(text).with_attachments(images)
}

fn render_workflow_run(payload: &WorkflowRunPayload) -> Notification {
    let run = &payload.workflow_run;
    let text = format!(
        "{} ran a workflow on {}:\n\
         Event: [{}]\n\
         Workflow: [{}]\n\
         Conclusion: [{}]\n\
         Commit: [ {} ]\n\
         Details: {}",
        payload.sender.login,
        payload.repository.full_name,
        run.event,
        run.name,
        run.conclusion,
        run.display_title,
        run.html_url,
    );
    Notification::new(text)
}

/// First line of a commit message.
fn headline(message: &str) -> &str {
    message.lines().next().unwrap_or_default().trim_end()
}
