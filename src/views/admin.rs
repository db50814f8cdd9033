use maud::{html, Markup};

use crate::db::models::{Account, DashboardCounts, PlayerRow, QuestionDetail, QuestionSummary};
use crate::models::ImportReport;
use crate::names;

fn nav(account: &Account, active: &str) -> Markup {
    let tabs = [
        ("dashboard", "Dashboard", names::ADMIN_URL.to_string()),
        (
            "questions",
            "Questions",
            names::ADMIN_QUESTIONS_URL.to_string(),
        ),
        ("import", "Import", names::ADMIN_IMPORT_URL.to_string()),
        ("users", "Players", names::ADMIN_USERS_URL.to_string()),
    ];

    html! {
        nav."admin-nav" {
            ul {
                @for (key, label, url) in tabs {
                    li {
                        a href=(url)
                          hx-get=(url)
                          hx-target="main"
                          hx-swap="innerHTML"
                          aria-current=[(key == active).then_some("page")] {
                            (label)
                        }
                    }
                }
            }
            ul {
                li."secondary" { (account.display_name) }
                li {
                    a href=(names::ADMIN_CHANGE_PASSWORD_URL)
                      hx-get=(names::ADMIN_CHANGE_PASSWORD_URL)
                      hx-target="main"
                      hx-swap="innerHTML" {
                        "Password"
                    }
                }
                li {
                    button."outline secondary"
                           hx-post=(names::ADMIN_LOGOUT_URL)
                           hx-swap="none" {
                        "Sign out"
                    }
                }
            }
        }
    }
}

pub fn dashboard(account: &Account, counts: &DashboardCounts) -> Markup {
    html! {
        (nav(account, "dashboard"))
        h1 { "Dashboard" }

        div."stat-grid" {
            article."stat-card" {
                p."stat-number" { (counts.total_questions) }
                p { "Questions" }
            }
            article."stat-card" {
                p."stat-number" { (counts.total_players) }
                p { "Players" }
            }
            article."stat-card" {
                p."stat-number" { (counts.active_players) }
                p { "Active in the last 24h" }
            }
        }
    }
}

pub fn questions(account: &Account, questions: &[QuestionSummary]) -> Markup {
    html! {
        (nav(account, "questions"))
        h1 { "Questions" }

        p {
            a role="button"
              href=(names::ADMIN_NEW_QUESTION_URL)
              hx-get=(names::ADMIN_NEW_QUESTION_URL)
              hx-target="main"
              hx-swap="innerHTML" {
                "New question"
            }
        }

        @if questions.is_empty() {
            article { p { "No questions yet. Add one, or import a batch." } }
        } @else {
            article {
                table {
                    thead { tr {
                        th { "Topic" }
                        th { "Passage" }
                        th { "Answer" }
                        th { }
                    } }
                    tbody {
                        @for q in questions {
                            tr {
                                td { (q.category) }
                                td."passage-cell" { (truncate(&q.passage, 60)) }
                                td { (q.correct_answer()) }
                                td style="white-space: nowrap;" {
                                    a href="#"
                                      hx-get=(names::admin_edit_question_url(q.id))
                                      hx-target="main"
                                      hx-swap="innerHTML" {
                                        "Edit"
                                    }
                                    " "
                                    a href="#"
                                      style="color: #dc3545;"
                                      hx-delete=(names::admin_question_url(q.id))
                                      hx-confirm="Delete this question?"
                                      hx-target="main"
                                      hx-swap="innerHTML" {
                                        "Delete"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}\u{2026}")
}

pub fn question_form(
    account: &Account,
    existing: Option<&QuestionDetail>,
    error: Option<&str>,
) -> Markup {
    let title = if existing.is_some() {
        "Edit question"
    } else {
        "New question"
    };

    html! {
        (nav(account, "questions"))
        h1 { (title) }

        @if let Some(msg) = error {
            article style="border-left: 4px solid #dc3545; padding: 0.75rem 1rem; margin-bottom: 1rem;" {
                p style="margin: 0; color: #dc3545;" { (msg) }
            }
        }

        article {
            @let edit_url = existing.map(|q| names::admin_question_url(q.id));
            form hx-post=[edit_url.is_none().then(|| names::ADMIN_QUESTIONS_URL.to_string())]
                 hx-put=[edit_url]
                 hx-ext="json-enc"
                 hx-target="main"
                 hx-swap="innerHTML" {
                label {
                    "Passage"
                    textarea name="passage"
                             rows="3"
                             required="true"
                             placeholder="For God so loved the world..." {
                        @if let Some(q) = existing { (q.passage) }
                    }
                }
                label {
                    "Topic"
                    select name="category" required="true" {
                        @for category in names::CATEGORIES {
                            @let selected = existing.is_some_and(|q| q.category == category);
                            option value=(category) selected[selected] { (category) }
                        }
                    }
                }

                p { "Options. Mark the correct reference." }
                @for idx in 0..4usize {
                    @let option = existing.and_then(|q| q.options.get(idx));
                    @let is_correct = match existing {
                        Some(q) => option == Some(&q.correct_answer),
                        None => idx == 0,
                    };
                    fieldset role="group" {
                        input type="radio"
                              name="correct"
                              value=(idx)
                              checked[is_correct]
                              aria-label=(format!("Option {} is correct", idx + 1));
                        input type="text"
                              name=(format!("book_{idx}"))
                              required="true"
                              placeholder="Book"
                              value=[option.map(|o| o.book.as_str())];
                        input type="number"
                              name=(format!("chapter_{idx}"))
                              required="true"
                              min="1"
                              placeholder="Chapter"
                              value=[option.map(|o| o.chapter)];
                        input type="number"
                              name=(format!("verse_{idx}"))
                              required="true"
                              min="1"
                              placeholder="Verse"
                              value=[option.map(|o| o.verse)];
                    }
                }

                label {
                    "Explanation (optional)"
                    textarea name="explanation"
                             rows="2"
                             placeholder="Shown to players after they answer." {
                        @if let Some(q) = existing { (q.explanation) }
                    }
                }

                button type="submit" {
                    @if existing.is_some() { "Save changes" } @else { "Create question" }
                }
            }
        }
    }
}

pub fn import(account: &Account, report: Option<&ImportReport>, error: Option<&str>) -> Markup {
    html! {
        (nav(account, "import"))
        h1 { "Bulk import" }
        p { "Paste a JSON array of questions. Each needs a passage, four options, and a correct answer." }

        @if let Some(error) = error {
            article style="border-left: 4px solid #dc3545; padding: 0.75rem 1rem; margin-bottom: 1rem;" {
                p style="margin: 0;" { "Nothing was imported: " (error) "." }
            }
        }

        @if let Some(report) = report {
            article style="border-left: 4px solid #28a745; padding: 0.75rem 1rem; margin-bottom: 1rem;" {
                p style="margin: 0;" {
                    "Imported " strong { (report.inserted) } " question(s)."
                    @if !report.failed.is_empty() {
                        " Skipped " (report.failed.len()) ":"
                    }
                }
                @if !report.failed.is_empty() {
                    ul style="margin-bottom: 0;" {
                        @for (idx, reason) in &report.failed {
                            li { "#" (idx + 1) ": " (reason) }
                        }
                    }
                }
            }
        }

        article {
            form hx-post=(names::ADMIN_IMPORT_URL)
                 hx-ext="json-enc"
                 hx-target="main"
                 hx-disabled-elt="find textarea, find button"
                 hx-swap="innerHTML" {
                textarea name="payload"
                         rows="12"
                         required="true"
                         placeholder=r#"[{"question": "...", "category": "...", "options": [...], "correctAnswer": {...}}]"# {}
                button type="submit" { "Import" }
            }
        }
    }
}

pub fn users(account: &Account, players: &[PlayerRow], active_only: bool) -> Markup {
    html! {
        (nav(account, "users"))
        h1 { "Players" }

        div role="group" style="width: fit-content;" {
            a role="button"
              class=(if active_only { "outline" } else { "" })
              href=(names::ADMIN_USERS_URL)
              hx-get=(names::ADMIN_USERS_URL)
              hx-target="main"
              hx-swap="innerHTML" {
                "All"
            }
            a role="button"
              class=(if active_only { "" } else { "outline" })
              href=(format!("{}?active=1", names::ADMIN_USERS_URL))
              hx-get=(format!("{}?active=1", names::ADMIN_USERS_URL))
              hx-target="main"
              hx-swap="innerHTML" {
                "Active (24h)"
            }
        }

        @if players.is_empty() {
            article { p { "Nobody here yet." } }
        } @else {
            article {
                table {
                    thead { tr {
                        th { "Name" }
                        th { "Email" }
                        th { "Score" }
                        th { "Last seen" }
                    } }
                    tbody {
                        @for p in players {
                            tr {
                                td { (p.name) }
                                td { (p.email.as_deref().unwrap_or("\u{2014}")) }
                                td { (p.score) }
                                td { (p.last_active) }
                            }
                        }
                    }
                }
            }
        }
    }
}
