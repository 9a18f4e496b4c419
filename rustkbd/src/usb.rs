//! USB HID transport: a boot keyboard, a consumer control and a mouse interface on one device.

mod device_info;
mod hid_report;
mod usb_communicator;

pub use device_info::DeviceInfo;
pub use hid_report::HidKeyboardReport;
pub use usb_communicator::UsbCommunicator;
