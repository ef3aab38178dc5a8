//! HTML templates for the web dashboard.
//!
//! Templates are embedded at compile time using `include_str!`. Each page
//! body is wrapped in the shared layout by [`render_page`].

/// Shared layout with navigation. Placeholders: `{{title}}`, `{{content}}`, `{{nav_*}}`.
pub const BASE_TEMPLATE: &str = include_str!("templates/base.html");

pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// Kanban board plus the full task log.
pub const TASKS_TEMPLATE: &str = include_str!("templates/tasks.html");

pub const PROMPTS_TEMPLATE: &str = include_str!("templates/prompts.html");

/// Week calendar and the next-up list.
pub const SCHEDULE_TEMPLATE: &str = include_str!("templates/schedule.html");

pub const PROJECTS_TEMPLATE: &str = include_str!("templates/projects.html");

/// Top-level pages, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Tasks,
    Prompts,
    Schedule,
    Projects,
}

impl Page {
    const ALL: [Page; 5] = [
        Page::Overview,
        Page::Tasks,
        Page::Prompts,
        Page::Schedule,
        Page::Projects,
    ];

    fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Tasks => "Tasks",
            Page::Prompts => "Prompts",
            Page::Schedule => "Schedule",
            Page::Projects => "Projects",
        }
    }

    fn nav_key(&self) -> &'static str {
        match self {
            Page::Overview => "{{nav_overview}}",
            Page::Tasks => "{{nav_tasks}}",
            Page::Prompts => "{{nav_prompts}}",
            Page::Schedule => "{{nav_schedule}}",
            Page::Projects => "{{nav_projects}}",
        }
    }

    fn body(&self) -> &'static str {
        match self {
            Page::Overview => INDEX_TEMPLATE,
            Page::Tasks => TASKS_TEMPLATE,
            Page::Prompts => PROMPTS_TEMPLATE,
            Page::Schedule => SCHEDULE_TEMPLATE,
            Page::Projects => PROJECTS_TEMPLATE,
        }
    }
}

/// Render a full page: layout, active nav link and page body.
pub fn render_page(page: Page) -> String {
    let mut html = BASE_TEMPLATE.replace("{{title}}", page.title());
    for other in Page::ALL {
        let class = if other == page { "active" } else { "" };
        html = html.replace(other.nav_key(), class);
    }
    html.replace("{{content}}", page.body())
}
