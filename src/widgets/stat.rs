use hypertext::prelude::*;

/// One of the dashboard's aggregate counters.
pub struct StatCard<'r> {
    pub label: &'r str,
    pub value: usize,
    pub tone: &'r str,
}

impl<'r> Renderable for StatCard<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud!({
            div class="col-6 col-md-3" {
                div class=(format!("card border-{} h-100", self.tone)) {
                    div class="card-body text-center" {
                        div class="fs-2 fw-bold" { (self.value) }
                        div class="text-muted" { (self.label) }
                    }
                }
            }
        })
        .render_to(buffer);
    }
}
