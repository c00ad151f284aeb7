//! Templating code.
//!
//! This defines the [`Page`] item, the shell every server-rendered page of
//! the admin interface sits inside.

use hypertext::prelude::*;

pub struct Page<R1: Renderable, R2: Renderable> {
    body: Option<R1>,
    extra_head: Option<R2>,
    admin: bool,
}

// unfortunate generic argument shenanigans
impl<R1: Renderable> Page<R1, String> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<R1: Renderable, R2: Renderable> Page<R1, R2> {
    pub fn body(mut self, body: R1) -> Self {
        self.body = Some(body);
        self
    }

    pub fn extra_head(mut self, content: R2) -> Self {
        self.extra_head = Some(content);
        self
    }

    /// Shows the admin navigation (dashboard link, logout) in the navbar.
    pub fn admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }
}

impl<R1: Renderable, R2: Renderable> Renderable for Page<R1, R2> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            html lang="en" {
                head {
                    title { "Tournament Registration" }
                    meta charset="utf-8";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                    link
                        href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css"
                        rel="stylesheet";
                    link href="/static/style.css" rel="stylesheet";
                    @if let Some(extra) = &self.extra_head {
                        (extra)
                    }
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #1d3557;"
                        data-bs-theme="dark" {
                        div class="container-fluid" {
                            a class="navbar-brand text-white" href="/" {
                                "Tournament Registration"
                            }
                            ul class="navbar-nav" {
                                @if self.admin {
                                    li class="nav-item" {
                                        a class="nav-link text-white"
                                          href="/teacher" {
                                            "Dashboard"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class="nav-link text-white"
                                          href="/teacher/logout" {
                                            "Log out"
                                        }
                                    }
                                } @else {
                                    li class="nav-item" {
                                        a class="nav-link text-white"
                                          href="/teacher/login" {
                                            "Teacher login"
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div class="container my-4 flex-grow-1" {
                        @if let Some(body) = &self.body {
                            (body)
                        }
                    }
                }
            }
        }
        .render_to(buffer)
    }
}

impl<R1: Renderable, R2: Renderable> Default for Page<R1, R2> {
    fn default() -> Self {
        Self {
            body: Default::default(),
            extra_head: Default::default(),
            admin: false,
        }
    }
}
