use super::{Key, MouseConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
    pub buttons: u8,
    pub x: i8,
    pub y: i8,
    pub wheel: i8,
    pub pan: i8,
}

impl MouseReport {
    pub fn is_idle(&self) -> bool {
        *self == MouseReport::default()
    }
}

pub(crate) fn mouse_report(keys: &[Key], config: &MouseConfig) -> MouseReport {
    let accel = [Key::MouseAccel0, Key::MouseAccel1, Key::MouseAccel2]
        .iter()
        .position(|acl| keys.contains(acl));
    let (speed, wheel_speed) = match accel {
        Some(i) => (config.accel_move_speeds[i], config.accel_wheel_speeds[i]),
        None => (config.move_speed, config.wheel_speed),
    };

    keys.iter().fold(MouseReport::default(), |mut report, key| {
        match key {
            Key::MouseUp => report.y = report.y.saturating_sub(speed),
            Key::MouseDown => report.y = report.y.saturating_add(speed),
            Key::MouseLeft => report.x = report.x.saturating_sub(speed),
            Key::MouseRight => report.x = report.x.saturating_add(speed),
            Key::MouseButton1 => report.buttons |= 0x01,
            Key::MouseButton2 => report.buttons |= 0x02,
            Key::MouseButton3 => report.buttons |= 0x04,
            Key::MouseWheelUp => report.wheel = report.wheel.saturating_add(wheel_speed),
            Key::MouseWheelDown => report.wheel = report.wheel.saturating_sub(wheel_speed),
            Key::MouseWheelLeft => report.pan = report.pan.saturating_sub(wheel_speed),
            Key::MouseWheelRight => report.pan = report.pan.saturating_add(wheel_speed),
            _ => {}
        }
        report
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_with_default_speed() {
        let config = MouseConfig::default();
        let report = mouse_report(&[Key::MouseUp, Key::MouseRight], &config);
        assert_eq!(report.x, 8);
        assert_eq!(report.y, -8);
        assert_eq!(report.buttons, 0);
    }

    #[test]
    fn slowest_held_acceleration_wins() {
        let config = MouseConfig::default();
        let report = mouse_report(
            &[Key::MouseAccel2, Key::MouseLeft, Key::MouseAccel0],
            &config,
        );
        assert_eq!(report.x, -2);
    }

    #[test]
    fn buttons_and_wheel() {
        let config = MouseConfig::default();
        let report = mouse_report(
            &[Key::MouseButton1, Key::MouseButton2, Key::MouseWheelDown, Key::MouseWheelRight],
            &config,
        );
        assert_eq!(report.buttons, 0x03);
        assert_eq!(report.wheel, -1);
        assert_eq!(report.pan, 1);
        assert!(!report.is_idle());
        assert!(mouse_report(&[Key::A], &config).is_idle());
    }
}
