use maud::{html, Markup};

use crate::db::models::Account;
use crate::federated::Provider;
use crate::names;

pub enum LoginState {
    NoError,
    IncorrectPassword,
    FederatedFailed,
}

pub fn login(state: LoginState, providers: &[Provider]) -> Markup {
    html! {
        h1 { "Admin sign in" }
        p { "The question editor lives behind this door." }

        @if matches!(state, LoginState::FederatedFailed) {
            article style="border-left: 4px solid #dc3545; padding: 0.75rem 1rem; margin-bottom: 1rem;" {
                p style="margin: 0; color: #dc3545;" {
                    "External sign-in failed. Try again, or use your password."
                }
            }
        }

        article style="width: fit-content;" {
            form hx-post=(names::ADMIN_LOGIN_URL)
                 hx-ext="json-enc"
                 hx-target="main"
                 hx-swap="innerHTML" {
                label {
                    "Email"
                    input name="email"
                          type="email"
                          autocomplete="email"
                          required="true"
                          placeholder="Email"
                          aria-label="Email";
                }
                label {
                    "Password"
                    @if matches!(state, LoginState::IncorrectPassword) {
                        input name="password"
                              type="password"
                              autocomplete="current-password"
                              required="true"
                              placeholder="Password"
                              aria-invalid="true"
                              aria-label="Password";
                        small { "Incorrect email or password." }
                    } @else {
                        input name="password"
                              type="password"
                              autocomplete="current-password"
                              required="true"
                              placeholder="Password"
                              aria-label="Password";
                    }
                }
                p style="margin-bottom: 0.5rem; font-size: 0.85rem;" {
                    a href=(names::ADMIN_FORGOT_PASSWORD_URL) { "Forgot password?" }
                }
                button type="submit" { "Sign in" }
            }

            @if !providers.is_empty() {
                hr;
                @for provider in providers {
                    p {
                        a role="button"
                          class="outline"
                          style="width: 100%;"
                          href=(names::admin_federated_url(provider.slug())) {
                            "Continue with " (provider.label())
                        }
                    }
                }
            }

            p {
                "No account? "
                a href=(names::ADMIN_REGISTER_URL) { "Register" }
            }
        }
        p {
            a href=(names::HOME_URL) { "Back to the quiz" }
        }
    }
}

pub enum RegisterState {
    NoError,
    EmailTaken,
    EmptyFields,
    WeakPassword,
}

pub fn register(state: RegisterState) -> Markup {
    let error_msg = match state {
        RegisterState::NoError => None,
        RegisterState::EmailTaken => Some("That email is already in use."),
        RegisterState::EmptyFields => Some("All fields are required."),
        RegisterState::WeakPassword => Some("Passwords need at least 8 characters."),
    };

    html! {
        h1 { "Create an account" }
        p { "Accounts start without editor access. An administrator has to grant it." }
        article style="width: fit-content;" {
            form hx-post=(names::ADMIN_REGISTER_URL)
                 hx-ext="json-enc"
                 hx-target="main"
                 hx-swap="innerHTML" {
                label {
                    "Email"
                    input name="email"
                          type="email"
                          autocomplete="email"
                          required="true"
                          placeholder="Email"
                          aria-label="Email";
                }
                label {
                    "Display name"
                    input name="display_name"
                          type="text"
                          autocomplete="name"
                          required="true"
                          placeholder="Display name"
                          aria-label="Display name";
                }
                label {
                    "Password"
                    @if let Some(msg) = error_msg {
                        input name="password"
                              type="password"
                              autocomplete="new-password"
                              required="true"
                              placeholder="Password"
                              aria-invalid="true"
                              aria-label="Password";
                        small { (msg) }
                    } @else {
                        input name="password"
                              type="password"
                              autocomplete="new-password"
                              required="true"
                              placeholder="Password"
                              aria-label="Password";
                    }
                }
                button type="submit" { "Register" }
            }
            p {
                "Already have an account? "
                a href=(names::ADMIN_LOGIN_URL) { "Sign in" }
            }
        }
    }
}

pub enum ForgotPasswordState {
    NoError,
    EmailNotConfigured,
    EmailSent,
}

pub fn forgot_password(state: ForgotPasswordState) -> Markup {
    match state {
        ForgotPasswordState::NoError => html! {
            h1 { "Forgot password" }
            p { "Enter your email and we'll send a reset link." }
            article style="width: fit-content;" {
                form hx-post=(names::ADMIN_FORGOT_PASSWORD_URL)
                     hx-ext="json-enc"
                     hx-target="main"
                     hx-swap="innerHTML" {
                    label {
                        "Email"
                        input name="email"
                              type="email"
                              autocomplete="email"
                              required="true"
                              placeholder="Email"
                              aria-label="Email";
                    }
                    button type="submit" { "Send reset link" }
                }
                p {
                    a href=(names::ADMIN_LOGIN_URL) { "Back to sign in" }
                }
            }
        },
        ForgotPasswordState::EmailNotConfigured => html! {
            h1 { "Forgot password" }
            p { "Password reset by email is not set up on this server. Ask whoever runs it." }
            p {
                a href=(names::ADMIN_LOGIN_URL) { "Back to sign in" }
            }
        },
        ForgotPasswordState::EmailSent => html! {
            h1 { "Forgot password" }
            p { "If that email has an account, a reset link is on its way." }
            p { "The link expires in 24 hours." }
            p {
                a href=(names::ADMIN_LOGIN_URL) { "Back to sign in" }
            }
        },
    }
}

pub enum ResetPasswordState {
    Form,
    InvalidToken,
    EmptyPassword,
    WeakPassword,
    Success,
}

pub fn reset_password(state: ResetPasswordState, token: &str) -> Markup {
    let error_msg = match state {
        ResetPasswordState::EmptyPassword => Some("A password is required."),
        ResetPasswordState::WeakPassword => Some("Passwords need at least 8 characters."),
        _ => None,
    };

    match state {
        ResetPasswordState::InvalidToken => html! {
            h1 { "Link expired" }
            p { "This reset link is invalid or has already been used." }
            p {
                a href=(names::ADMIN_FORGOT_PASSWORD_URL) { "Request a new one" }
            }
        },
        ResetPasswordState::Success => html! {
            h1 { "Password updated" }
            p { "You can sign in with your new password now." }
            p {
                a href=(names::ADMIN_LOGIN_URL) { "Sign in" }
            }
        },
        _ => html! {
            h1 { "Reset password" }
            p { "Choose a new password for your account." }
            article style="width: fit-content;" {
                form hx-post=(names::ADMIN_RESET_PASSWORD_URL)
                     hx-ext="json-enc"
                     hx-target="main"
                     hx-swap="innerHTML" {
                    input type="hidden" name="token" value=(token);
                    label {
                        "New password"
                        @if let Some(msg) = error_msg {
                            input name="password"
                                  type="password"
                                  autocomplete="new-password"
                                  required="true"
                                  placeholder="New password"
                                  aria-invalid="true"
                                  aria-label="New password";
                            small { (msg) }
                        } @else {
                            input name="password"
                                  type="password"
                                  autocomplete="new-password"
                                  required="true"
                                  placeholder="New password"
                                  aria-label="New password";
                        }
                    }
                    button type="submit" { "Reset password" }
                }
            }
        },
    }
}

pub enum ChangePasswordState {
    NoError,
    IncorrectPassword,
    EmptyFields,
    WeakPassword,
    Success,
}

pub fn change_password(account: &Account, state: ChangePasswordState) -> Markup {
    let (error_msg, success_msg) = match state {
        ChangePasswordState::NoError => (None, None),
        ChangePasswordState::IncorrectPassword => (Some("Current password is incorrect."), None),
        ChangePasswordState::EmptyFields => (Some("Both fields are required."), None),
        ChangePasswordState::WeakPassword => {
            (Some("Passwords need at least 8 characters."), None)
        }
        ChangePasswordState::Success => (None, Some("Password changed.")),
    };

    html! {
        h1 { "Your account" }

        article style="width: fit-content;" {
            label {
                "Email"
                input type="email" value=(account.email) disabled="true";
            }
            label {
                "Display name"
                input type="text" value=(account.display_name) disabled="true";
            }
        }

        h2 { "Change password" }

        @if let Some(msg) = success_msg {
            p style="color: var(--pico-ins-color);" { (msg) }
        }

        article style="width: fit-content;" {
            form hx-post=(names::ADMIN_CHANGE_PASSWORD_URL)
                 hx-ext="json-enc"
                 hx-target="main"
                 hx-disabled-elt="find input, find button"
                 hx-swap="innerHTML" {
                label {
                    "Current password"
                    @if let Some(msg) = error_msg {
                        input name="current_password"
                              type="password"
                              autocomplete="current-password"
                              required="true"
                              placeholder="Current password"
                              aria-invalid="true"
                              aria-label="Current password";
                        small { (msg) }
                    } @else {
                        input name="current_password"
                              type="password"
                              autocomplete="current-password"
                              required="true"
                              placeholder="Current password"
                              aria-label="Current password";
                    }
                }
                label {
                    "New password"
                    input name="new_password"
                          type="password"
                          autocomplete="new-password"
                          required="true"
                          placeholder="New password"
                          aria-label="New password";
                }
                button type="submit" { "Change password" }
            }
            p {
                a href=(names::ADMIN_URL)
                  hx-get=(names::ADMIN_URL)
                  hx-target="main"
                  hx-swap="innerHTML" {
                    "Back to the dashboard"
                }
            }
        }
    }
}
