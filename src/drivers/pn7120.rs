//! PN7120 controller link over I2C.
//!
//! Configures the I2C master port, the VEN (enable) output, and the IRQ
//! input using raw ESP-IDF sys calls. The PN7120 signals a pending packet
//! by driving IRQ high; reads are two-phase (3-byte header, then the
//! declared payload).
//!
//! On non-espidf targets every operation is a no-op so host tests can link
//! the crate; tests exercise the protocol through `MockLink` instead.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::drivers::ControllerLink;
use crate::error::Result;
#[cfg(target_os = "espidf")]
use crate::error::LinkError;
use crate::nci::frame::RawFrame;
#[cfg(target_os = "espidf")]
use crate::nci::frame::HEADER_LEN;
#[cfg(target_os = "espidf")]
use crate::pins;

pub struct Pn7120Link {
    #[cfg(target_os = "espidf")]
    i2c_port: i2c_port_t,
}

#[cfg(target_os = "espidf")]
impl Pn7120Link {
    /// Bring up the I2C port and the VEN/IRQ GPIOs. Called once from
    /// `main()` before the control loop starts.
    pub fn init() -> Result<Self> {
        let i2c_port = 0 as i2c_port_t;

        // SAFETY: called once from main() before the control loop;
        // single-threaded, no peripheral is shared.
        unsafe {
            let i2c_cfg = i2c_config_t {
                mode: i2c_mode_t_I2C_MODE_MASTER,
                sda_io_num: pins::I2C_SDA_GPIO,
                scl_io_num: pins::I2C_SCL_GPIO,
                sda_pullup_en: true,
                scl_pullup_en: true,
                __bindgen_anon_1: i2c_config_t__bindgen_ty_1 {
                    master: i2c_config_t__bindgen_ty_1__bindgen_ty_1 {
                        clk_speed: pins::I2C_FREQ_HZ,
                    },
                },
                ..Default::default()
            };
            let ret = i2c_param_config(i2c_port, &i2c_cfg);
            if ret != ESP_OK as i32 {
                return Err(LinkError::GpioConfigFailed(ret).into());
            }
            let ret = i2c_driver_install(i2c_port, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0);
            if ret != ESP_OK as i32 {
                return Err(LinkError::GpioConfigFailed(ret).into());
            }

            let ven_cfg = gpio_config_t {
                pin_bit_mask: 1u64 << pins::NFC_VEN_GPIO,
                mode: gpio_mode_t_GPIO_MODE_OUTPUT,
                pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
                pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
                intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
            };
            let ret = gpio_config(&ven_cfg);
            if ret != ESP_OK as i32 {
                return Err(LinkError::GpioConfigFailed(ret).into());
            }

            let irq_cfg = gpio_config_t {
                pin_bit_mask: 1u64 << pins::NFC_IRQ_GPIO,
                mode: gpio_mode_t_GPIO_MODE_INPUT,
                pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
                pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
                intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
            };
            let ret = gpio_config(&irq_cfg);
            if ret != ESP_OK as i32 {
                return Err(LinkError::GpioConfigFailed(ret).into());
            }
        }

        info!("pn7120: I2C and VEN/IRQ configured");
        Ok(Self { i2c_port })
    }

    fn irq_high(&self) -> bool {
        // SAFETY: register read on an already-configured input pin.
        (unsafe { gpio_get_level(pins::NFC_IRQ_GPIO) }) != 0
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        // SAFETY: I2C port 0 was installed in init(); main-loop only.
        let ret = unsafe {
            i2c_master_read_from_device(
                self.i2c_port,
                pins::NFC_I2C_ADDRESS,
                buf.as_mut_ptr(),
                buf.len(),
                ms_to_ticks(pins::I2C_TIMEOUT_MS),
            )
        };
        if ret != ESP_OK as i32 {
            return Err(LinkError::BusReadFailed(ret).into());
        }
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
fn ms_to_ticks(ms: u32) -> u32 {
    ms / (1000 / configTICK_RATE_HZ)
}

#[cfg(target_os = "espidf")]
impl ControllerLink for Pn7120Link {
    fn hardware_reset(&mut self) -> Result<()> {
        // SAFETY: VEN pin configured as output in init(); main-loop only.
        unsafe {
            if gpio_set_level(pins::NFC_VEN_GPIO, 0) != ESP_OK as i32 {
                return Err(LinkError::ResetFailed.into());
            }
            std::thread::sleep(core::time::Duration::from_millis(pins::VEN_LOW_MS as u64));
            if gpio_set_level(pins::NFC_VEN_GPIO, 1) != ESP_OK as i32 {
                return Err(LinkError::ResetFailed.into());
            }
        }
        std::thread::sleep(core::time::Duration::from_millis(pins::VEN_SETTLE_MS as u64));
        info!("pn7120: VEN pulse complete");
        Ok(())
    }

    fn write(&mut self, frame: &[u8]) -> Result<()> {
        // SAFETY: I2C port 0 was installed in init(); main-loop only.
        let ret = unsafe {
            i2c_master_write_to_device(
                self.i2c_port,
                pins::NFC_I2C_ADDRESS,
                frame.as_ptr(),
                frame.len(),
                ms_to_ticks(pins::I2C_TIMEOUT_MS),
            )
        };
        if ret != ESP_OK as i32 {
            return Err(LinkError::BusWriteFailed(ret).into());
        }
        Ok(())
    }

    fn poll(&mut self, timeout_ms: u32) -> Result<Option<RawFrame>> {
        let mut waited = 0;
        while !self.irq_high() {
            if waited >= timeout_ms {
                return Ok(None);
            }
            std::thread::sleep(core::time::Duration::from_millis(1));
            waited += 1;
        }

        let mut header = [0u8; HEADER_LEN];
        self.read_exact(&mut header)?;

        let payload_len = header[2] as usize;
        let mut frame = RawFrame::new();
        // Header fits by construction; payload length is bounded by u8.
        let _ = frame.extend_from_slice(&header);
        if payload_len > 0 {
            let mut payload = [0u8; 255];
            self.read_exact(&mut payload[..payload_len])?;
            let _ = frame.extend_from_slice(&payload[..payload_len]);
        }
        Ok(Some(frame))
    }
}

#[cfg(not(target_os = "espidf"))]
impl Pn7120Link {
    pub fn init() -> Result<Self> {
        info!("pn7120(sim): peripheral init skipped");
        Ok(Self {})
    }
}

#[cfg(not(target_os = "espidf"))]
impl ControllerLink for Pn7120Link {
    fn hardware_reset(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, _frame: &[u8]) -> Result<()> {
        Ok(())
    }

    fn poll(&mut self, _timeout_ms: u32) -> Result<Option<RawFrame>> {
        Ok(None)
    }
}
