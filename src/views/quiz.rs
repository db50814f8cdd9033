use maud::{html, Markup};

use crate::db::models::LeaderboardEntry;
use crate::engine::QuizState;
use crate::names;

pub fn welcome(name: Option<&str>, last_score: Option<u32>) -> Markup {
    html! {
        section."quiz-hero" {
            h1 { "Test your Bible knowledge" }
            p { "Guess which verse a passage comes from. Four choices, one minute per question." }
        }

        article style="width: fit-content;" {
            form hx-post=(names::SET_NAME_URL)
                 hx-ext="json-enc"
                 hx-target="main"
                 hx-swap="innerHTML" {
                label {
                    "Your name"
                    input name="name"
                          type="text"
                          autocomplete="nickname"
                          required="true"
                          maxlength="40"
                          placeholder="Your name"
                          value=[name]
                          aria-label="Your name";
                }
                button type="submit" { "Let's go" }
            }
            @if let Some(score) = last_score {
                p."secondary" { "Last time you scored " strong { (score) } "." }
            }
        }

        p {
            a href="#"
              hx-get=(names::LEADERBOARD_URL)
              hx-target="main"
              hx-swap="innerHTML" {
                "See the leaderboard"
            }
        }
        p style="font-size: 0.8rem;" {
            a."secondary" href=(names::ADMIN_URL) { "Admin" }
        }
    }
}

pub fn categories(name: &str, notice: Option<&str>) -> Markup {
    html! {
        h1 { "Pick a topic" }
        p { "Hi " mark { (name) } ", what do you want to be quizzed on?" }

        @if let Some(msg) = notice {
            article style="border-left: 4px solid #dc3545; padding: 0.75rem 1rem; margin-bottom: 1rem;" {
                p style="margin: 0; color: #dc3545;" { (msg) }
            }
        }

        div."category-grid" {
            @for category in names::CATEGORIES {
                article."category-card" {
                    h3 { (category) }
                    form hx-post=(names::START_QUIZ_URL)
                         hx-ext="json-enc"
                         hx-target="main"
                         hx-swap="innerHTML" {
                        input type="hidden" name="category" value=(category);
                        button type="submit" style="width: fit-content;" { "Start" }
                    }
                }
            }
        }

        p style="margin-top: 0.5rem; font-size: 0.8rem;" {
            a href="#"
              style="color: #888;"
              hx-post=(names::ABANDON_QUIZ_URL)
              hx-target="main"
              hx-swap="innerHTML" {
                "Not " (name) "? Change name"
            }
        }
    }
}

/// The countdown fragment. Polls the tick endpoint once a second and swaps
/// itself; on expiry the server retargets the response at `main`.
pub fn countdown(time_left: u16) -> Markup {
    let class = if time_left <= 10 {
        "countdown countdown-low"
    } else {
        "countdown"
    };

    html! {
        div id="countdown"
            class=(class)
            hx-post=(names::TICK_URL)
            hx-trigger="every 1s"
            hx-swap="outerHTML" {
            "\u{23F1} " (time_left) "s"
        }
    }
}

pub fn question(state: &QuizState) -> Markup {
    let Some(current) = state.current_question() else {
        return html! { p { "The quiz is over." } };
    };

    html! {
        @if let Some(ref category) = state.category {
            p { "Topic: " mark { (category) } }
        }
        article style="width: fit-content;" {
            div style="display: flex; align-items: center; gap: 1rem; margin-bottom: 0.5rem;" {
                p style="color: #666; font-size: 0.9rem; margin-bottom: 0;" {
                    "Question "
                    strong { (state.current + 1) }
                    " of "
                    (state.total_questions())
                }
                span style="margin-left: auto;" {
                    (countdown(state.time_left))
                }
            }

            h3."passage" { "\u{201C}" (current.passage) "\u{201D}" }
            p { "Where is this found?" }

            form id="question-form" hx-ext="json-enc" {
                fieldset {
                    @for (idx, option) in current.options.iter().enumerate() {
                        @let selected = state.pending.as_ref() == Some(option);
                        label {
                            input type="radio"
                                  name="option"
                                  value=(idx)
                                  checked[selected]
                                  onchange="enableSubmitButton()"
                                  hx-post=(names::SELECT_ANSWER_URL)
                                  hx-swap="none";
                            (option)
                        }
                    }
                }
            }
            div style="display: flex; gap: 1rem; margin-top: 1rem; align-items: center;" {
                p style="margin-bottom: 0; font-size: 0.9rem;" { "Score: " (state.score) }
                span style="margin-left: auto;" {
                    button id="submit-btn"
                           hx-post=(names::SUBMIT_ANSWER_URL)
                           hx-target="main"
                           hx-swap="innerHTML"
                           disabled[state.pending.is_none()] {
                        "Submit answer"
                    }
                }
            }
            script {
                "function enableSubmitButton() { document.getElementById('submit-btn').disabled = false; }"
            }
        }
        p style="margin-top: 0.5rem; font-size: 0.8rem;" {
            a onclick="document.getElementById('abandon-dialog').showModal()"
              style="color: #888; text-decoration: underline; cursor: pointer;" {
                "Quit quiz"
            }
        }
        dialog id="abandon-dialog" {
            article {
                p { "Quit this quiz? Your progress will be lost." }
                footer style="display: flex; gap: 0.5rem; justify-content: flex-end;" {
                    button onclick="document.getElementById('abandon-dialog').close()"
                           class="secondary" {
                        "Keep playing"
                    }
                    button hx-post=(names::ABANDON_QUIZ_URL)
                           hx-target="main" {
                        "Quit"
                    }
                }
            }
        }
    }
}

pub fn feedback(state: &QuizState) -> Markup {
    let Some(current) = state.current_question() else {
        return html! { p { "The quiz is over." } };
    };

    let correct = state.last_answer_correct().unwrap_or(false);

    html! {
        @if let Some(ref category) = state.category {
            p { "Topic: " mark { (category) } }
        }
        article style="width: fit-content;" {
            p style="color: #666; font-size: 0.9rem; margin-bottom: 0.5rem;" {
                "Question "
                strong { (state.current + 1) }
                " of "
                (state.total_questions())
            }

            @if correct {
                h3 style="color: #28a745;" { "Correct!" }
            } @else {
                h3 style="color: #dc3545;" { "Not quite." }
            }

            p."passage" { "\u{201C}" (current.passage) "\u{201D}" }

            form {
                fieldset disabled="true" {
                    @for option in &current.options {
                        @let is_selected = state.pending.as_ref() == Some(option);
                        @let is_answer = *option == current.correct_answer;
                        @let css_class = if is_answer {
                            "option-correct"
                        } else if is_selected {
                            "option-incorrect"
                        } else {
                            "option-neutral"
                        };

                        div class=(css_class) {
                            label {
                                input type="radio" name="option" checked[is_selected];
                                (option)
                                @if is_answer {
                                    span class="badge-correct" { "Correct answer" }
                                } @else if is_selected {
                                    span class="badge-incorrect" { "Your answer" }
                                }
                            }
                        }
                    }
                }
            }

            @if !current.explanation.is_empty() {
                div class="explanation" {
                    (current.explanation)
                }
            }

            div style="display: flex; gap: 1rem; margin-top: 1rem; align-items: center;" {
                p style="margin-bottom: 0; font-size: 0.9rem;" { "Score: " (state.score) }
                span style="margin-left: auto;" {
                    button hx-post=(names::NEXT_QUESTION_URL)
                           hx-target="main"
                           hx-swap="innerHTML" {
                        @if state.is_last_question() {
                            "See results"
                        } @else {
                            "Next question"
                        }
                    }
                }
            }
        }
    }
}

pub fn results(state: &QuizState) -> Markup {
    let total = state.total_questions();
    let category = state.category.as_deref().unwrap_or("Bible");
    let share_text = format!(
        "I scored {}/{} in the {} quiz on VerseQuiz. Can you beat me?",
        state.score, total, category
    );

    html! {
        h1 { "Quiz complete!" }
        article style="width: fit-content; text-align: center;" {
            p."final-score" {
                span style="font-size: 3rem; font-weight: 700;" { (state.score) }
                span style="font-size: 1.5rem; color: #666;" { " / " (total) }
            }
            p {
                @if state.score as usize == total {
                    "Flawless. Every single one."
                } @else if state.score as usize * 2 >= total {
                    "Nicely done."
                } @else {
                    "Room to grow. Try another round?"
                }
            }

            span id="share-text" hidden { (share_text) }
            div style="display: flex; gap: 0.5rem; justify-content: center; flex-wrap: wrap;" {
                button class="outline" onclick="shareScore(this)" { "Share score" }
                button hx-post=(names::RESET_QUIZ_URL)
                       hx-target="main"
                       hx-swap="innerHTML" {
                    "Play again"
                }
                button class="secondary"
                       hx-get=(names::LEADERBOARD_URL)
                       hx-target="main"
                       hx-swap="innerHTML" {
                    "Leaderboard"
                }
            }
            script {
                "function shareScore(btn) {
                    const text = document.getElementById('share-text').textContent;
                    navigator.clipboard.writeText(text).then(function () {
                        btn.textContent = 'Copied!';
                    });
                }"
            }
        }
        p {
            a href="#"
              hx-post=(names::ABANDON_QUIZ_URL)
              hx-target="main"
              hx-swap="innerHTML" {
                "Back to start"
            }
        }
    }
}

pub fn leaderboard(entries: &[LeaderboardEntry], viewer: Option<&str>) -> Markup {
    html! {
        h1 { "Leaderboard" }

        @if entries.is_empty() {
            article {
                p { "No scores yet. Be the first!" }
            }
        } @else {
            article {
                table {
                    thead { tr {
                        th { "#" }
                        th { "Player" }
                        th { "Score" }
                    } }
                    tbody {
                        @for (idx, entry) in entries.iter().enumerate() {
                            @let own = viewer == Some(entry.public_id.as_str());
                            tr class=[own.then_some("leaderboard-self")] {
                                td { (idx + 1) }
                                td {
                                    (entry.name)
                                    @if own { " " span."badge-you" { "you" } }
                                }
                                td { (entry.score) }
                            }
                        }
                    }
                }
            }
        }

        div style="display: flex; gap: 0.5rem;" {
            button hx-post=(names::RESET_QUIZ_URL)
                   hx-target="main"
                   hx-swap="innerHTML" {
                "Play"
            }
            button class="secondary"
                   hx-post=(names::ABANDON_QUIZ_URL)
                   hx-target="main"
                   hx-swap="innerHTML" {
                "Home"
            }
        }
    }
}
