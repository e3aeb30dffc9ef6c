use sceneterm_protocol::{Message, Packet, ToggleDebugDraw};
use tracing::info;

use super::HandlerContext;
use crate::graph::SceneGraph;

impl<'a, G: SceneGraph> HandlerContext<'a, G> {
    pub(super) fn handle_toggle_debug_draw(&mut self, mut packet: ToggleDebugDraw) -> Packet {
        packet.debug_draw_on = self.session.toggle_debug(packet.layer);
        info!(layer = ?packet.layer, on = packet.debug_draw_on, "debug overlay toggled");
        packet.into_packet()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use sceneterm_protocol::DebugLayer;

    fn toggle(fx: &mut Fixture, layer: DebugLayer) -> bool {
        let packet = fx.ctx().route_message(ToggleDebugDraw::new(layer).into_packet());
        ToggleDebugDraw::from_packet(packet).unwrap().debug_draw_on
    }

    #[test]
    fn test_toggle_flips_and_reports() {
        let mut fx = Fixture::new();
        assert!(toggle(&mut fx, DebugLayer::Hierarchy));
        assert!(fx.session.debug_flags().hierarchy);
        assert!(!toggle(&mut fx, DebugLayer::Hierarchy));
        assert!(!fx.session.debug_flags().hierarchy);
    }

    #[test]
    fn test_layers_are_independent() {
        let mut fx = Fixture::new();
        assert!(toggle(&mut fx, DebugLayer::Bounds));
        assert!(toggle(&mut fx, DebugLayer::Wireframe));
        let flags = fx.session.debug_flags();
        assert!(flags.bounds && flags.wireframe && !flags.hierarchy);
    }
}
