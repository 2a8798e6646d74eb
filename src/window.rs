// File: window.rs
// Location: /src/window.rs

use gdk_pixbuf::Pixbuf;
use gtk4::prelude::*;
use gtk4::glib;
use image::GrayImage;
use libadwaita::{self as adw, prelude::AdwDialogExt};
use std::cell::RefCell;
use std::rc::Rc;

use crate::config::ShellSettings;
use crate::qr::QrEncoder;
use crate::shell::{self, ShellState, StatusTone};

const TONE_CLASSES: [StatusTone; 4] = [
    StatusTone::Busy,
    StatusTone::Success,
    StatusTone::Warning,
    StatusTone::Error,
];

pub struct QrWindow {
    pub window: adw::ApplicationWindow,
}

#[derive(Clone)]
struct Widgets {
    window: adw::ApplicationWindow,
    entry: gtk4::Entry,
    save_button: gtk4::Button,
    preview: gtk4::Stack,
    picture: gtk4::Picture,
    status_label: gtk4::Label,
}

impl QrWindow {
    pub fn new(
        app: &adw::Application,
        encoder: QrEncoder,
        settings: ShellSettings,
        initial_url: Option<&str>,
    ) -> Self {
        Self::load_css();

        let preview_size = settings.preview_size;
        let state = Rc::new(RefCell::new(ShellState::new(encoder, settings)));

        let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
        content.set_margin_top(25);
        content.set_margin_bottom(25);
        content.set_margin_start(25);
        content.set_margin_end(25);

        let title = gtk4::Label::builder()
            .label("QR Code Generator")
            .css_classes(vec!["title-1".to_string()])
            .margin_bottom(25)
            .build();
        content.append(&title);

        let url_label = gtk4::Label::builder()
            .label("Website URL:")
            .css_classes(vec!["heading".to_string()])
            .xalign(0.0)
            .margin_bottom(5)
            .build();
        content.append(&url_label);

        let entry = gtk4::Entry::builder()
            .placeholder_text("https://")
            .input_purpose(gtk4::InputPurpose::Url)
            .margin_bottom(20)
            .build();
        if let Some(url) = initial_url {
            entry.set_text(url);
            entry.select_region(0, -1);
        }
        content.append(&entry);

        let generate_button = gtk4::Button::builder()
            .label("Generate QR")
            .css_classes(vec!["suggested-action".to_string(), "touch-target".to_string()])
            .margin_bottom(10)
            .build();
        content.append(&generate_button);

        let save_button = gtk4::Button::builder()
            .label("Save QR")
            .css_classes(vec!["success".to_string(), "touch-target".to_string()])
            .sensitive(false)
            .margin_bottom(20)
            .build();
        content.append(&save_button);

        let placeholder = gtk4::Label::builder()
            .label("Generate a QR code")
            .css_classes(vec!["dim-label".to_string()])
            .build();

        let picture = gtk4::Picture::new();
        picture.set_content_fit(gtk4::ContentFit::Contain);
        picture.set_can_shrink(true);

        let preview = gtk4::Stack::new();
        preview.set_size_request(preview_size, preview_size);
        preview.add_named(&placeholder, Some("placeholder"));
        preview.add_named(&picture, Some("image"));
        preview.set_visible_child_name("placeholder");

        let frame = gtk4::Frame::builder()
            .child(&preview)
            .halign(gtk4::Align::Center)
            .css_classes(vec!["qr-frame".to_string()])
            .margin_bottom(10)
            .build();
        content.append(&frame);

        let status_label = gtk4::Label::new(None);
        status_label.add_css_class("status-text");
        content.append(&status_label);

        let tip = gtk4::Label::builder()
            .label("Tip: press Enter after typing a URL")
            .css_classes(vec!["dim-label".to_string(), "caption".to_string()])
            .margin_top(10)
            .build();
        content.append(&tip);

        let menu_button = gtk4::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .tooltip_text("Menu")
            .build();
        let menu = gio::Menu::new();
        menu.append(Some("About"), Some("app.about"));
        menu_button.set_menu_model(Some(&menu));

        let header = adw::HeaderBar::new();
        header.pack_end(&menu_button);

        let toolbar_view = adw::ToolbarView::new();
        toolbar_view.add_top_bar(&header);
        toolbar_view.set_content(Some(&content));

        let window = adw::ApplicationWindow::builder()
            .application(app)
            .title("QR Code Generator")
            .default_width(550)
            .default_height(650)
            .resizable(false)
            .content(&toolbar_view)
            .build();

        let widgets = Widgets {
            window: window.clone(),
            entry: entry.clone(),
            save_button: save_button.clone(),
            preview,
            picture,
            status_label,
        };
        widgets.sync(&state.borrow());

        let widgets_ref = widgets.clone();
        let state_ref = state.clone();
        generate_button.connect_clicked(move |_| {
            Self::on_generate(&widgets_ref, &state_ref);
        });

        let widgets_ref = widgets.clone();
        let state_ref = state.clone();
        entry.connect_activate(move |_| {
            Self::on_generate(&widgets_ref, &state_ref);
        });

        let widgets_ref = widgets.clone();
        let state_ref = state.clone();
        save_button.connect_clicked(move |_| {
            Self::on_save(&widgets_ref, &state_ref);
        });

        let about_action = gio::SimpleAction::new("about", None);
        let window_weak = window.downgrade();
        about_action.connect_activate(move |_, _| {
            if let Some(window) = window_weak.upgrade() {
                Self::show_about_dialog(&window);
            }
        });
        app.add_action(&about_action);

        entry.grab_focus();

        Self { window }
    }

    fn on_generate(widgets: &Widgets, state: &Rc<RefCell<ShellState>>) {
        let url = widgets.entry.text();
        state.borrow_mut().begin_generate();
        widgets.sync(&state.borrow());

        // Encode on the next idle pass so the busy status gets drawn first.
        let widgets = widgets.clone();
        let state = state.clone();
        glib::idle_add_local_once(move || {
            state.borrow_mut().generate(url.as_str());
            let state = state.borrow();
            widgets.sync(&state);
            widgets.show_image(&state);
        });
    }

    fn on_save(widgets: &Widgets, state: &Rc<RefCell<ShellState>>) {
        let target = state.borrow_mut().save_target(shell::default_save_dir());
        widgets.sync(&state.borrow());
        let Some(target) = target else {
            return;
        };

        // Raise the window so the native dialog opens on top of it.
        widgets.window.present();

        let png_filter = gtk4::FileFilter::new();
        png_filter.set_name(Some("PNG files"));
        png_filter.add_pattern("*.png");

        let all_filter = gtk4::FileFilter::new();
        all_filter.set_name(Some("All files"));
        all_filter.add_pattern("*");

        let filters = gio::ListStore::new::<gtk4::FileFilter>();
        filters.append(&png_filter);
        filters.append(&all_filter);

        let dialog = gtk4::FileDialog::builder()
            .title("Save QR")
            .modal(true)
            .initial_folder(&gio::File::for_path(&target.initial_dir))
            .initial_name(target.initial_name.as_str())
            .filters(&filters)
            .default_filter(&png_filter)
            .build();

        let widgets = widgets.clone();
        let state = state.clone();
        glib::spawn_future_local(async move {
            let result = dialog.save_future(Some(&widgets.window)).await;

            match result {
                Ok(file) => match file.path() {
                    Some(path) => {
                        state.borrow_mut().finish_save(Some(path));
                    }
                    None => state
                        .borrow_mut()
                        .fail_save("Selected location is not a local file"),
                },
                Err(e)
                    if e.matches(gtk4::DialogError::Dismissed)
                        || e.matches(gtk4::DialogError::Cancelled) =>
                {
                    state.borrow_mut().finish_save(None);
                }
                Err(e) => state.borrow_mut().fail_save(&e.to_string()),
            }

            widgets.sync(&state.borrow());
        });
    }

    fn show_about_dialog(window: &adw::ApplicationWindow) {
        let about = adw::AboutDialog::builder()
            .application_name("QR Code Generator")
            .application_icon("view-grid-symbolic")
            .developer_name("PlayRood")
            .version(env!("CARGO_PKG_VERSION"))
            .comments("Turn a URL into a QR code")
            .license_type(gtk4::License::Gpl30)
            .build();

        about.present(Some(window));
    }

    fn load_css() {
        let provider = gtk4::CssProvider::new();

        let css = r#"
button.touch-target {
    min-height: 44px;
    padding: 8px 14px;
    font-weight: bold;
}

button.success {
    background: @success_bg_color;
    color: @success_fg_color;
}

.qr-frame {
    padding: 10px;
    background: white;
}

.status-text {
    font-size: 0.95em;
}
"#;
        provider.load_from_data(css);

        let Some(display) = gtk4::gdk::Display::default() else {
            log::warn!("No display available for styling");
            return;
        };
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }

    pub fn present(&self) {
        self.window.present();
    }
}

impl Widgets {
    fn sync(&self, state: &ShellState) {
        let status = state.status();
        self.status_label.set_text(&status.text);
        for tone in TONE_CLASSES {
            if let Some(class) = tone.css_class() {
                self.status_label.remove_css_class(class);
            }
        }
        if let Some(class) = status.tone.css_class() {
            self.status_label.add_css_class(class);
        }

        self.save_button.set_sensitive(state.save_enabled());
    }

    fn show_image(&self, state: &ShellState) {
        match state.image() {
            Some(image) => {
                self.picture.set_pixbuf(Some(&to_pixbuf(image)));
                self.preview.set_visible_child_name("image");
            }
            None => {
                self.picture.set_pixbuf(None);
                self.preview.set_visible_child_name("placeholder");
            }
        }
    }
}

fn to_pixbuf(image: &GrayImage) -> Pixbuf {
    let width = image.width() as i32;
    let height = image.height() as i32;

    let mut rgb_bytes = Vec::with_capacity((width * height * 3) as usize);
    for pixel in image.pixels() {
        let val = pixel[0];
        rgb_bytes.push(val);
        rgb_bytes.push(val);
        rgb_bytes.push(val);
    }

    Pixbuf::from_bytes(
        &glib::Bytes::from(&rgb_bytes),
        gdk_pixbuf::Colorspace::Rgb,
        false,
        8,
        width,
        height,
        width * 3,
    )
}
