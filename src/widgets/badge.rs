use hypertext::prelude::*;

/// Colored payment indicator for one player's payment cell.
pub struct PaymentBadge<'r> {
    pub status: &'r str,
}

impl<'r> Renderable for PaymentBadge<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let paid = self.status == "Yes";

        maud!({
            span class=(if paid {
                "badge text-bg-success"
            } else {
                "badge text-bg-danger"
            }) {
                (if paid { "Paid" } else { "Unpaid" })
            }
        })
        .render_to(buffer);
    }
}
