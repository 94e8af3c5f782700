#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_halt as _;

mod screen;

#[rtic::app(device = rp_pico::hal::pac, peripherals = true, dispatchers = [I2C0_IRQ, I2C1_IRQ])]
mod app {
    use crate::screen::{Locked, Screen};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::channel::{Channel, Receiver, Sender};
    use embedded_hal::digital::v2::ToggleableOutputPin;
    use keypad_clock::config;
    use keypad_clock::edit::Editor;
    use keypad_clock::keypad::{KeyCode, Keypad, LAYOUT};
    use keypad_clock::store::TimeStore;
    use keypad_clock::tasks;
    use max7219::MAX7219;
    use rp_pico::hal::{
        clocks::{init_clocks_and_plls, Clock},
        fugit::{ExtU32, RateExtU32},
        gpio::{
            bank0::Gpio25, DynPinId, FunctionSioInput, FunctionSioOutput, Pin, PullDown, PullUp,
        },
        sio::Sio,
        spi::Spi,
        timer::{Alarm, Alarm0, Alarm1, Timer},
        watchdog::Watchdog,
    };
    use rtic::Mutex;

    type Store = TimeStore<CriticalSectionRawMutex>;
    type KeyQueue = Channel<CriticalSectionRawMutex, KeyCode, { config::KEY_QUEUE_DEPTH }>;
    type KeyTx = Sender<'static, CriticalSectionRawMutex, KeyCode, { config::KEY_QUEUE_DEPTH }>;
    type KeyRx = Receiver<'static, CriticalSectionRawMutex, KeyCode, { config::KEY_QUEUE_DEPTH }>;
    type RowPin = Pin<DynPinId, FunctionSioOutput, PullDown>;
    type ColPin = Pin<DynPinId, FunctionSioInput, PullUp>;
    type LedPin = Pin<Gpio25, FunctionSioOutput, PullDown>;

    // Shared resources (accessed by multiple tasks)
    #[shared]
    struct Shared {
        screen: Screen,
    }

    // Local resources (accessed by single tasks)
    #[local]
    struct Local {
        tick_alarm: Alarm0,
        scan_alarm: Alarm1,
        led: LedPin,
        keypad: Keypad<RowPin, ColPin, 4, 4>,
        key_tx: KeyTx,
        key_rx: KeyRx,
        tick_store: &'static Store,
        advance_store: &'static Store,
        refresh_store: &'static Store,
        edit_store: &'static Store,
    }

    #[init(local = [store: Store = TimeStore::new(), keys: KeyQueue = Channel::new()])]
    fn init(ctx: init::Context) -> (Shared, Local) {
        let mut pac = ctx.device;
        let mut watchdog = Watchdog::new(pac.WATCHDOG);
        let sio = Sio::new(pac.SIO);

        let Ok(clocks) = init_clocks_and_plls(
            config::XTAL_FREQ_HZ,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        ) else {
            defmt::panic!("clock init failed");
        };

        let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
        let Some(mut tick_alarm) = timer.alarm_0() else {
            defmt::panic!("alarm 0 taken");
        };
        let Some(mut scan_alarm) = timer.alarm_1() else {
            defmt::panic!("alarm 1 taken");
        };
        // First tick in one second, first scan after one scan period.
        tick_alarm.schedule(config::TICK_PERIOD_US.micros()).ok();
        tick_alarm.enable_interrupt();
        scan_alarm.schedule(config::SCAN_PERIOD_US.micros()).ok();
        scan_alarm.enable_interrupt();

        let pins = rp_pico::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        let led = pins.led.into_push_pull_output();

        let rows = [
            pins.gpio2.into_push_pull_output().into_dyn_pin(),
            pins.gpio3.into_push_pull_output().into_dyn_pin(),
            pins.gpio4.into_push_pull_output().into_dyn_pin(),
            pins.gpio5.into_push_pull_output().into_dyn_pin(),
        ];
        let cols = [
            pins.gpio6.into_pull_up_input().into_dyn_pin(),
            pins.gpio7.into_pull_up_input().into_dyn_pin(),
            pins.gpio8.into_pull_up_input().into_dyn_pin(),
            pins.gpio9.into_pull_up_input().into_dyn_pin(),
        ];
        let keypad = Keypad::new(rows, cols, LAYOUT);

        let mosi = pins.gpio19.into_function::<rp_pico::hal::gpio::FunctionSpi>();
        let sck = pins.gpio18.into_function::<rp_pico::hal::gpio::FunctionSpi>();
        let miso = pins.gpio16.into_function::<rp_pico::hal::gpio::FunctionSpi>();
        let cs = pins.gpio17.into_push_pull_output();

        let spi = Spi::<_, _, _, 8>::new(pac.SPI0, (mosi, miso, sck));
        let spi = spi.init(
            &mut pac.RESETS,
            clocks.peripheral_clock.freq(),
            config::SPI_BAUD_HZ.Hz(),
            &embedded_hal::spi::MODE_0,
        );

        let Ok(mut driver) = MAX7219::from_spi_cs(config::DISPLAY_DEVICES, spi, cs) else {
            defmt::panic!("matrix init failed");
        };
        driver.power_on().ok();
        for i in 0..config::DISPLAY_DEVICES {
            driver.set_intensity(i, config::DISPLAY_INTENSITY).ok();
            driver.clear_display(i).ok();
        }

        let store: &'static Store = ctx.local.store;
        let keys: &'static KeyQueue = ctx.local.keys;

        advance::spawn().ok();
        refresh::spawn().ok();
        edit::spawn().ok();
        defmt::info!("clock started at {}", config::INITIAL_TIME);

        (
            Shared {
                screen: Screen::new(driver),
            },
            Local {
                tick_alarm,
                scan_alarm,
                led,
                keypad,
                key_tx: keys.sender(),
                key_rx: keys.receiver(),
                tick_store: store,
                advance_store: store,
                refresh_store: store,
                edit_store: store,
            },
        )
    }

    // Hardware Task: Timer Interrupt (1Hz)
    #[task(binds = TIMER_IRQ_0, priority = 3, local = [tick_alarm, led, tick_store])]
    fn rtc_tick(ctx: rtc_tick::Context) {
        // Clear interrupt and schedule next
        ctx.local.tick_alarm.clear_interrupt();
        ctx.local
            .tick_alarm
            .schedule(config::TICK_PERIOD_US.micros())
            .ok();

        ctx.local.led.toggle().ok();
        ctx.local.tick_store.tick();
    }

    // Hardware Task: Keypad scan and cursor blink (Timer 1)
    #[task(binds = TIMER_IRQ_1, priority = 2, shared = [screen], local = [scan_alarm, keypad, key_tx, scans: u16 = 0])]
    fn keypad_scan(mut ctx: keypad_scan::Context) {
        ctx.local.scan_alarm.clear_interrupt();
        ctx.local
            .scan_alarm
            .schedule(config::SCAN_PERIOD_US.micros())
            .ok();

        if let Some(key) = ctx.local.keypad.scan() {
            if ctx.local.key_tx.try_send(key).is_err() {
                defmt::warn!("key queue full, dropped {}", key);
            }
        }

        *ctx.local.scans += 1;
        if *ctx.local.scans >= config::BLINK_SCANS {
            *ctx.local.scans = 0;
            ctx.shared.screen.lock(|screen| screen.blink());
        }
    }

    #[task(priority = 2, local = [advance_store])]
    async fn advance(ctx: advance::Context) {
        if let Err(err) = tasks::advance_loop(*ctx.local.advance_store).await {
            defmt::error!("advance task halted: {}", err);
        }
    }

    #[task(priority = 1, shared = [screen], local = [refresh_store])]
    async fn refresh(ctx: refresh::Context) {
        let mut display = Locked(ctx.shared.screen);
        let result =
            tasks::refresh_loop(*ctx.local.refresh_store, &mut display, config::TIME_ORIGIN).await;
        if let Err(err) = result {
            defmt::error!("refresh task halted: {}", err);
        }
    }

    #[task(priority = 1, shared = [screen], local = [edit_store, key_rx])]
    async fn edit(ctx: edit::Context) {
        let mut display = Locked(ctx.shared.screen);
        let mut editor = Editor::new(config::EDIT_ORIGIN);
        let result =
            tasks::edit_loop(*ctx.local.edit_store, ctx.local.key_rx, &mut editor, &mut display)
                .await;
        if let Err(err) = result {
            defmt::error!("edit task halted: {}", err);
        }
    }
}
