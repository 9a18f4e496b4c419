use usb_device::{
    class_prelude::{UsbBus, UsbBusAllocator},
    device::{StringDescriptors, UsbDevice, UsbDeviceBuilder, UsbDeviceState},
    LangID, UsbError,
};
use usbd_hid::{
    descriptor::{MediaKeyboardReport, MouseReport as HidMouseReport, SerializedDescriptor},
    hid_class::HIDClass,
};

use crate::keyboard::{ExternalCommunicator, Key, MouseReport};

use super::{hid_report::HidKeyboardReport, DeviceInfo};

pub struct UsbCommunicator<'a, B: UsbBus> {
    usb_device: UsbDevice<'a, B>,
    keyboard_usb_hid: HIDClass<'a, B>,
    media_usb_hid: HIDClass<'a, B>,
    mouse_usb_hid: HIDClass<'a, B>,
}

impl<'a, B: UsbBus> UsbCommunicator<'a, B> {
    const NUM_ROLLOVER: usize = 6;

    pub fn new(
        device_info: DeviceInfo,
        usb_bus_alloc: &'a UsbBusAllocator<B>,
    ) -> Result<UsbCommunicator<'a, B>, UsbError> {
        let keyboard_usb_hid = HIDClass::new(usb_bus_alloc, HidKeyboardReport::desc(), 10);
        let media_usb_hid = HIDClass::new(usb_bus_alloc, MediaKeyboardReport::desc(), 10);
        let mouse_usb_hid = HIDClass::new(usb_bus_alloc, HidMouseReport::desc(), 10);
        let descriptors = StringDescriptors::new(LangID::EN_US)
            .manufacturer(device_info.manufacturer)
            .serial_number(device_info.serial_number)
            .product(device_info.product_name);
        let usb_device = UsbDeviceBuilder::new(usb_bus_alloc, device_info.vid_pid())
            .strings(&[descriptors])
            .map_err(|_| UsbError::InvalidState)?
            .device_class(0)
            .build();

        Ok(UsbCommunicator {
            usb_device,
            keyboard_usb_hid,
            media_usb_hid,
            mouse_usb_hid,
        })
    }

    pub fn poll(&mut self) {
        self.usb_device.poll(&mut [
            &mut self.keyboard_usb_hid,
            &mut self.media_usb_hid,
            &mut self.mouse_usb_hid,
        ]);
    }

    pub fn state(&self) -> UsbDeviceState {
        self.usb_device.state()
    }
}

impl<'a, B: UsbBus> ExternalCommunicator for UsbCommunicator<'a, B> {
    type Error = UsbError;

    fn is_ready(&self) -> bool {
        self.usb_device.state() == UsbDeviceState::Configured
    }

    fn send_keys(&self, keys: &[Key]) -> Result<(), UsbError> {
        let keyboard_report = keyboard_report(keys, Self::NUM_ROLLOVER);
        let media_key = keys.iter().find(|key| key.is_media_key());
        let media_keyboard_report = media_report(media_key);

        self.keyboard_usb_hid.push_input(&keyboard_report)?;
        self.media_usb_hid.push_input(&media_keyboard_report)?;
        Ok(())
    }

    fn send_mouse(&self, report: &MouseReport) -> Result<(), UsbError> {
        self.mouse_usb_hid.push_input(&mouse_report(report))?;
        Ok(())
    }
}

fn keyboard_report(keys: &[Key], rollover: usize) -> HidKeyboardReport {
    let mut report = HidKeyboardReport::empty();
    report.modifier = keys
        .iter()
        .map(|key| key.modifier_key_flag())
        .fold(0x00_u8, |acc, flg| acc | flg);
    keys.iter()
        .filter_map(|key| key.key_code())
        .take(rollover)
        .enumerate()
        .for_each(|(i, c)| report.key_codes[i] = c);
    report
}

fn media_report(key: Option<&Key>) -> MediaKeyboardReport {
    MediaKeyboardReport {
        usage_id: key.map(|key| key.media_usage_id()).unwrap_or(0),
    }
}

fn mouse_report(report: &MouseReport) -> HidMouseReport {
    HidMouseReport {
        buttons: report.buttons,
        x: report.x,
        y: report.y,
        wheel: report.wheel,
        pan: report.pan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_report_sets_modifiers_and_codes() {
        let report = keyboard_report(&[Key::LeftShift, Key::RightAlt_W, Key::Question], 6);
        assert_eq!(report.modifier, 0b0100_0010);
        assert_eq!(report.key_codes, [0x1a, 0x38, 0, 0, 0, 0]);
    }

    #[test]
    fn keyboard_report_is_limited_to_rollover() {
        let keys = [Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G];
        let report = keyboard_report(&keys, 6);
        assert_eq!(report.key_codes, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
    }

    #[test]
    fn media_report_uses_consumer_usage() {
        // packed なのでフィールドはコピーしてから比べる
        assert_eq!({ media_report(Some(&Key::BrightnessIncrement)).usage_id }, 0x6f);
        assert_eq!({ media_report(Some(&Key::MediaPlayPause)).usage_id }, 0xcd);
        assert_eq!({ media_report(None).usage_id }, 0);
    }

    #[test]
    fn mouse_report_copies_fields() {
        let report = mouse_report(&MouseReport {
            buttons: 1,
            x: -3,
            y: 4,
            wheel: 1,
            pan: -1,
        });
        assert_eq!((report.buttons, report.x, report.y), (1, -3, 4));
        assert_eq!((report.wheel, report.pan), (1, -1));
    }
}
