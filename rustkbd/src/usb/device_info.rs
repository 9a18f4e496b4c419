use usb_device::device::UsbVidPid;

/// Strings and IDs the keyboard reports to the USB host.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub manufacturer: &'static str,
    pub vendor_id: u16,
    pub product_id: u16,
    pub product_name: &'static str,
    pub serial_number: &'static str,
}

impl DeviceInfo {
    pub fn vid_pid(&self) -> UsbVidPid {
        UsbVidPid(self.vendor_id, self.product_id)
    }
}
